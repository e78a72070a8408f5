use worse_compiler::codegen::CompileError;
use worse_compiler::interpreter::RunError;
use worse_compiler::parser::ParseError;
use worse_compiler::*;

const PROGRAMS: &[(&str, i64, &str)] = &[
    ("?main()a=0;while(a=:5)a=a+1;;sos=a;;", 5, ""),
    ("?double(a)sos=a++2;;?main()x=double(5);sos=x;;", 10, ""),
    (
        "?add(a,b)sos=a+b;;?main()print(72,105);sos=add(1,add(2,3));;",
        6,
        "Hi",
    ),
    ("?main()n=5;f=1;while(n:=1)f=f++n;n=n-1;;sos=f--7;;", 17, ""),
];

#[test]
fn test_programs_run_and_compile() {
    for (source, result, output) in PROGRAMS {
        let execution = interpret(source, "main").unwrap();
        assert_eq!(execution.result, *result, "{}", source);
        assert_eq!(execution.output, *output, "{}", source);

        let asm = compile(source, "main").unwrap();
        assert!(asm.starts_with(".cpu cortex-m0\n"), "{}", source);
        assert!(asm.contains("\n.data\n") && asm.contains("\n.text\n"));
    }
}

#[test]
fn test_missing_return_is_reported_by_both_consumers() {
    let source = "?main()a=1;;";
    assert!(matches!(
        interpret(source, "main"),
        Err(Error::Run(RunError::MissingReturn { ref function, .. })) if function == "main"
    ));
    assert!(matches!(
        compile(source, "main"),
        Err(Error::Compile(CompileError::MissingReturn { ref function, .. })) if function == "main"
    ));
}

#[test]
fn test_recursion_only_runs_in_the_interpreter() {
    let source = "?sum(n)sos=0;if(n:=0)sos=n+sum(n-1);;;?main()sos=sum(10);;";
    assert_eq!(interpret(source, "main").unwrap().result, 55);
    assert!(matches!(
        compile(source, "main"),
        Err(Error::Compile(CompileError::RecursiveCall { .. }))
    ));
}

#[test]
fn test_parse_source_round_trips_through_display() {
    let source = "?f(a,b)sos=a+b++2;;?main()print(f(1,2));sos=0;;";
    let program = parse_source(source, &Limits::default()).unwrap();
    let rendered: Vec<String> = program.iter().map(|f| f.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "?f(a, b) { sos = (a + (b ++ 2)); }",
            "?main() { print(f(1, 2)); sos = 0; }",
        ]
    );
}

#[test]
fn test_limits_reach_the_parser() {
    let source = "?main()sos=0;if(1)if(1)sos=1;;;;";
    let limits = Limits::default().with_max_nesting(1);
    assert!(matches!(
        interpret_with_limits(source, "main", &limits),
        Err(Error::Parse(_))
    ));
    assert_eq!(interpret(source, "main").unwrap().result, 1);
}

#[test]
fn test_long_operator_chain_is_an_error_not_a_crash() {
    let source = format!("?main()sos=1{};;", "+1".repeat(200_000));
    assert!(matches!(
        interpret(&source, "main"),
        Err(Error::Parse(ParseError::NestingTooDeep { .. }))
    ));
    assert!(matches!(
        compile(&source, "main"),
        Err(Error::Parse(ParseError::NestingTooDeep { .. }))
    ));

    let source = format!("?main()sos=1{};;", "+1".repeat(128));
    assert_eq!(interpret(&source, "main").unwrap().result, 129);
    assert!(compile(&source, "main").is_ok());
}

#[test]
fn test_compile_with_limits() {
    let source = "?main()sos=0;if(1)if(1)sos=1;;;;";
    let limits = Limits::default().with_max_nesting(1);
    assert!(matches!(
        compile_with_limits(source, "main", &limits),
        Err(Error::Parse(ParseError::NestingTooDeep { limit: 1, .. }))
    ));
    assert_eq!(
        compile_with_limits(source, "main", &Limits::default()).unwrap(),
        compile(source, "main").unwrap()
    );
}
