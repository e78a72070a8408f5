use worse_compiler::error::render_error;
use worse_compiler::*;

#[test]
fn test_error_messages() {
    let err = interpret("?main()sos=$;;", "main").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Failed lexing because: Unexpected character '$' at position 11");
    assert_eq!(err.position(), Some(11));

    let err = interpret("?f()sos=1;;?f()sos=2;;", "f").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Failed parsing because: Function `f` is defined more than once");

    let err = interpret("?main()a=1;;", "main").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Failed running because: Function `main` does not return a value: `sos` is never assigned");

    let err = compile("?main()sos=300;;", "main").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Failed compiling because: Value 300 at position 11 can't be loaded as an immediate (0-255)");
}

#[test]
fn test_parse_error_message() {
    let err = interpret("?main()sos=1 2;;", "main").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Failed parsing because: Expected `;`, `,` or `)`, but got `2` which is a(n) integer, at position 13");
}

#[test]
fn test_errors_keep_their_stage() {
    assert!(matches!(
        interpret("?main()sos=1;", "main"),
        Err(Error::Parse(_))
    ));
    assert!(matches!(
        interpret("?main()sos=1--0;;", "main"),
        Err(Error::Run(_))
    ));
    assert!(matches!(
        compile("?main()sos=x;;", "main"),
        Err(Error::Compile(_))
    ));
}

#[test]
fn test_render_labels_position() {
    let source = "?main()sos=$;;";
    let err = interpret(source, "main").unwrap_err();
    let rendered = render_error(source, "prog.w", &err);
    assert!(rendered.contains("Lex error"), "{}", rendered);
    assert!(rendered.contains("prog.w"), "{}", rendered);
    assert!(
        rendered.contains("Unexpected character '$' at position 11"),
        "{}",
        rendered
    );
    assert!(rendered.contains("?main()sos=$;;"), "{}", rendered);
}

#[test]
fn test_render_without_position() {
    let source = "?main()sos=1;;";
    let err = interpret(source, "start").unwrap_err();
    assert_eq!(err.position(), None);
    let rendered = render_error(source, "prog.w", &err);
    assert!(rendered.contains("Run error"), "{}", rendered);
    assert!(
        rendered.contains("Wanted to start at `start` but the function does not exist"),
        "{}",
        rendered
    );
}

#[test]
fn test_render_end_of_input() {
    let source = "?main()sos=1;";
    let err = interpret(source, "main").unwrap_err();
    let rendered = render_error(source, "prog.w", &err);
    assert!(rendered.contains("Parse error"), "{}", rendered);
    assert!(
        rendered.contains("Expected `;`, but reached the end of the input"),
        "{}",
        rendered
    );
}
