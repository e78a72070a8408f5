use std::env;
use std::fs;
use std::process;

use worse_compiler::ast::DEFAULT_ENTRY;
use worse_compiler::error::display_error;
use worse_compiler::{codegen, interpreter, lexer, parser, Error, Limits};

const USAGE: &str = "Usage: worse [--compile] [--entry NAME] [--max-depth N] \
[--max-iterations N] [--tokens] [--ast] [-o FILE] <source>";

struct Options {
    path: String,
    compile: bool,
    entry: String,
    limits: Limits,
    dump_tokens: bool,
    dump_ast: bool,
    output: Option<String>,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut path = None;
    let mut options = Options {
        path: String::new(),
        compile: false,
        entry: DEFAULT_ENTRY.to_string(),
        limits: Limits::default(),
        dump_tokens: false,
        dump_ast: false,
        output: None,
    };

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        let mut value = || {
            args.next()
                .cloned()
                .ok_or_else(|| format!("Missing value for {}", arg))
        };
        match arg.as_str() {
            "--compile" | "-c" => options.compile = true,
            "--tokens" => options.dump_tokens = true,
            "--ast" => options.dump_ast = true,
            "--entry" | "-e" => options.entry = value()?,
            "--output" | "-o" => options.output = Some(value()?),
            "--max-depth" => {
                let depth = value()?
                    .parse::<usize>()
                    .map_err(|e| format!("Invalid --max-depth: {}", e))?;
                options.limits = options.limits.with_max_call_depth(depth);
            }
            "--max-iterations" => {
                let iterations = value()?
                    .parse::<u64>()
                    .map_err(|e| format!("Invalid --max-iterations: {}", e))?;
                options.limits = options.limits.with_max_loop_iterations(iterations);
            }
            flag if flag.starts_with('-') => return Err(format!("Unknown option: {}", flag)),
            file => {
                if path.replace(file.to_string()).is_some() {
                    return Err("Only one source file can be given".to_string());
                }
            }
        }
    }

    options.path = path.ok_or_else(|| "No source file given".to_string())?;
    Ok(options)
}

/// Runs the pipeline and returns the text to write out.
fn run(options: &Options, source: &str) -> Result<String, Error> {
    let tokens = lexer::tokenize(source)?;
    if options.dump_tokens {
        for token in &tokens {
            eprintln!("{:?}", token);
        }
    }

    let program = parser::parse_with_limits(tokens, &options.limits)?;
    if options.dump_ast {
        for function in &program {
            eprintln!("{}", function);
        }
    }

    if options.compile {
        return Ok(codegen::generate(&program, &options.entry)?);
    }

    let execution = interpreter::run_with_limits(&program, &options.entry, &options.limits)?;
    Ok(format!("{}\n{}\n", execution.output, execution.result))
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };

    let source = match fs::read_to_string(&options.path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", options.path, e);
            process::exit(1);
        }
    };

    let text = match run(&options, &source) {
        Ok(text) => text,
        Err(error) => {
            if display_error(&source, &options.path, &error).is_err() {
                eprintln!("{}", error);
            }
            process::exit(1);
        }
    };

    match &options.output {
        Some(path) => {
            if let Err(e) = fs::write(path, text) {
                eprintln!("Error writing file '{}': {}", path, e);
                process::exit(1);
            }
        }
        None => print!("{}", text),
    }
}
