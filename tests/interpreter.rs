use worse_compiler::interpreter::RunError;
use worse_compiler::*;

fn result_of(source: &str) -> i64 {
    interpret(source, "main")
        .expect("Program should run")
        .result
}

fn run_error(source: &str) -> RunError {
    match interpret(source, "main") {
        Err(Error::Run(e)) => e,
        other => panic!("Expected a run error, got {:?}", other),
    }
}

#[test]
fn test_arithmetic() {
    assert_eq!(result_of("?main()sos=2++3;;"), 6);
    assert_eq!(result_of("?main()sos=7--2;;"), 3);
    assert_eq!(result_of("?main()sos=4+5;;"), 9);
    assert_eq!(result_of("?main()sos=5-3;;"), 2);
    assert_eq!(result_of("?main()sos=2+3++4;;"), 14);
    assert_eq!(result_of("?main()sos=10-4-3;;"), 3);
}

#[test]
fn test_floor_division_rounds_down() {
    assert_eq!(result_of("?main()a=0-7;sos=a--2;;"), -4);
    assert_eq!(result_of("?main()a=0-2;sos=7--a;;"), -4);
    assert_eq!(result_of("?main()a=0-6;sos=a--3;;"), -2);
}

#[test]
fn test_comparisons() {
    assert_eq!(result_of("?main()sos=3==3;;"), 1);
    assert_eq!(result_of("?main()sos=3!=3;;"), 0);
    assert_eq!(result_of("?main()sos=5:=3;;"), 1);
    assert_eq!(result_of("?main()sos=3:=5;;"), 0);
    assert_eq!(result_of("?main()sos=3=:5;;"), 1);
    assert_eq!(result_of("?main()sos=5=:5;;"), 0);
}

#[test]
fn test_while_loop() {
    assert_eq!(result_of("?main()a=0;while(a=:5)a=a+1;;sos=a;;"), 5);
    assert_eq!(result_of("?main()a=9;while(0)a=a+1;;sos=a;;"), 9);
}

#[test]
fn test_if_runs_at_most_once() {
    assert_eq!(result_of("?main()a=0;if(1)a=a+1;;sos=a;;"), 1);
    assert_eq!(result_of("?main()a=0;if(0)a=a+1;;sos=a;;"), 0);
    // The body makes the condition true again; `if` must not loop.
    assert_eq!(result_of("?main()a=0;if(a==0)a=a+1;a=0;;sos=5;;"), 5);
}

#[test]
fn test_function_call() {
    assert_eq!(result_of("?double(a)sos=a++2;;?main()x=double(5);sos=x;;"), 10);
}

#[test]
fn test_frames_are_independent() {
    let source = "?f(x)x=x+1;sos=x;;?main()x=10;y=f(x);sos=x++100+y;;";
    assert_eq!(result_of(source), 1011);
}

#[test]
fn test_recursion() {
    let source = "?fact(n)sos=1;if(n:=1)sos=n++fact(n-1);;;?main()sos=fact(5);;";
    assert_eq!(result_of(source), 120);
}

#[test]
fn test_print_output() {
    let execution = interpret("?main()print(72,105);sos=0;;", "main").unwrap();
    assert_eq!(execution.output, "Hi");
    assert_eq!(execution.result, 0);
}

#[test]
fn test_print_is_immediate() {
    // The call's own print happens before the outer print appends anything.
    let source = "?p(c)print(c);sos=c;;?main()print(p(65),66);sos=0;;";
    assert_eq!(interpret(source, "main").unwrap().output, "AAB");
}

#[test]
fn test_custom_entry() {
    assert_eq!(interpret("?go()sos=7;;", "go").unwrap().result, 7);
}

#[test]
fn test_runs_are_pure() {
    let source = "?p(c)print(c);sos=c+1;;?main()a=p(80);sos=p(a);;";
    let first = interpret(source, "main").unwrap();
    let second = interpret(source, "main").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.output, "PQ");
    assert_eq!(first.result, 82);
}

#[test]
fn test_missing_return() {
    assert_eq!(
        run_error("?main()a=1;;"),
        RunError::MissingReturn {
            function: "main".to_string(),
            position: 1
        }
    );
    let err = run_error("?f()a=1;;?main()sos=f();;");
    assert!(matches!(err, RunError::MissingReturn { ref function, .. } if function == "f"));
}

#[test]
fn test_undefined_names() {
    assert_eq!(
        run_error("?main()sos=x;;"),
        RunError::UndefinedVariable {
            name: "x".to_string(),
            function: "main".to_string(),
            position: 11
        }
    );
    assert_eq!(
        run_error("?main()sos=f();;"),
        RunError::UndefinedFunction {
            name: "f".to_string(),
            position: 11
        }
    );
}

#[test]
fn test_argument_count() {
    assert_eq!(
        run_error("?f(a)sos=a;;?main()sos=f(1,2);;"),
        RunError::ArgumentCount {
            name: "f".to_string(),
            expected: 1,
            found: 2,
            position: 23
        }
    );
}

#[test]
fn test_entry_checks() {
    assert_eq!(
        interpret("?main()sos=1;;", "start").unwrap_err(),
        Error::Run(RunError::EntryNotFound("start".to_string()))
    );
    assert_eq!(
        run_error("?main(a)sos=a;;"),
        RunError::EntryHasParameters {
            name: "main".to_string(),
            count: 1
        }
    );
}

#[test]
fn test_division_by_zero() {
    assert_eq!(
        run_error("?main()sos=1--0;;"),
        RunError::DivisionByZero { position: 12 }
    );
}

#[test]
fn test_overflow() {
    assert_eq!(
        run_error("?main()sos=99999999999999999999;;"),
        RunError::Overflow { position: 11 }
    );
    assert_eq!(
        run_error("?main()a=4294967296;sos=a++a;;"),
        RunError::Overflow { position: 25 }
    );
}

#[test]
fn test_invalid_character() {
    assert_eq!(
        run_error("?main()print(0-1);sos=0;;"),
        RunError::InvalidCharacter {
            value: -1,
            position: 14
        }
    );
}

#[test]
fn test_call_depth_limit() {
    let source = "?f(n)sos=f(n+1);;?main()sos=f(0);;";
    let limits = Limits::default().with_max_call_depth(10);
    assert_eq!(
        interpret_with_limits(source, "main", &limits).unwrap_err(),
        Error::Run(RunError::DepthExceeded {
            limit: 10,
            function: "f".to_string(),
            position: 9
        })
    );
    assert!(matches!(
        run_error(source),
        RunError::DepthExceeded { limit: 256, .. }
    ));
}

#[test]
fn test_iteration_limit() {
    let source = "?main()while(1)a=1;;sos=0;;";
    let limits = Limits::default().with_max_loop_iterations(100);
    assert_eq!(
        interpret_with_limits(source, "main", &limits).unwrap_err(),
        Error::Run(RunError::IterationLimit { limit: 100 })
    );

    let counted = "?main()a=0;while(a=:100)a=a+1;;sos=a;;";
    assert_eq!(
        interpret_with_limits(counted, "main", &limits).unwrap().result,
        100
    );
}
