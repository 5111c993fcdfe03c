//! Command-line front end: prints the suite/test outline of Mocha-style spec files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing_subscriber::EnvFilter;

use testmap::lang::is_spec_extension;
use testmap::{
    filter_by_effective_tags, propagate_tags, visit_each_test, Node, ScanError, ScanOptions,
    Scanner, TestList, TestNames,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Tree,
    Names,
    Json,
    Effective,
    Tags(Vec<String>),
    Count,
}

struct CliArgs {
    mode: Mode,
    suite_keywords: Vec<String>,
    test_keywords: Vec<String>,
    paths: Vec<String>,
}

impl CliArgs {
    fn options(&self) -> ScanOptions {
        let mut options = ScanOptions::default();
        for k in &self.suite_keywords {
            options = options.with_suite_keyword(k.as_str());
        }
        for k in &self.test_keywords {
            options = options.with_test_keyword(k.as_str());
        }
        options
    }
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut mode: Option<(&str, Mode)> = None;
    let mut suite_keywords = Vec::new();
    let mut test_keywords = Vec::new();
    let mut paths = Vec::new();
    let mut i = 0;

    while i < args.len() {
        let arg = args[i].as_str();
        let picked = match arg {
            "--names" => Some(Mode::Names),
            "--json" => Some(Mode::Json),
            "--effective" => Some(Mode::Effective),
            "--count" => Some(Mode::Count),
            "--tags" => {
                i += 1;
                let list = args.get(i).ok_or("--tags requires a comma-separated list")?;
                let wanted: Vec<String> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect();
                if wanted.is_empty() {
                    return Err("--tags: empty tag list".to_string());
                }
                Some(Mode::Tags(wanted))
            }
            "--suite-keyword" | "--test-keyword" => {
                i += 1;
                let keyword = args
                    .get(i)
                    .ok_or_else(|| format!("{arg} requires a keyword"))?
                    .clone();
                if arg == "--suite-keyword" {
                    suite_keywords.push(keyword);
                } else {
                    test_keywords.push(keyword);
                }
                None
            }
            flag if flag.starts_with('-') => {
                return Err(format!("unknown option: {flag}"));
            }
            _ => {
                paths.push(args[i].clone());
                None
            }
        };

        if let Some(picked) = picked {
            if let Some((previous, _)) = &mode {
                return Err(format!("{previous} and {arg} are mutually exclusive"));
            }
            mode = Some((arg, picked));
        }
        i += 1;
    }

    Ok(CliArgs {
        mode: mode.map_or(Mode::Tree, |(_, m)| m),
        suite_keywords,
        test_keywords,
        paths,
    })
}

fn main() {
    init_tracing();

    let raw: Vec<String> = std::env::args().skip(1).collect();

    if raw.is_empty() || raw[0] == "-h" || raw[0] == "--help" {
        print_help();
        std::process::exit(0);
    }

    let args = match parse_args(&raw) {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("testmap: {msg}");
            std::process::exit(1);
        }
    };

    if args.paths.is_empty() {
        eprintln!("testmap: no files specified");
        std::process::exit(1);
    }

    let scanner = Scanner::new(args.options());
    let files = collect_files(&args.paths);
    let mut failed = false;
    let mut report = Report::default();

    for path in &files {
        match scanner.scan_file(path) {
            Ok(mut result) => {
                propagate_tags(&mut result.structure);
                report.add(&args.mode, path, result);
            }
            Err(e) => {
                failed = true;
                match e {
                    ScanError::Io { .. } => eprintln!("testmap: {e}"),
                    _ => eprintln!("testmap: {}: {e}", path.display()),
                }
            }
        }
    }

    report.finish(&args.mode);
    if failed {
        std::process::exit(1);
    }
}

/// Output state carried across files.
#[derive(Default)]
struct Report {
    printed: usize,
    files: usize,
    test_count: usize,
    pending_test_count: usize,
    json: BTreeMap<String, Vec<Node>>,
}

impl Report {
    fn add(&mut self, mode: &Mode, path: &Path, result: TestNames) {
        self.files += 1;
        self.test_count += result.test_count;
        self.pending_test_count += result.pending_test_count;

        match mode {
            Mode::Count => {}
            Mode::Json => {
                self.json.insert(path.display().to_string(), result.structure);
            }
            Mode::Tree => {
                self.header(path);
                println!("{}", TestList(&result.structure));
            }
            Mode::Names => {
                self.header(path);
                println!("describe names: {}", result.suite_names.join(", "));
                println!("test names: {}", result.test_names.join(", "));
            }
            Mode::Effective => {
                self.header(path);
                visit_each_test(&result.structure, |test| {
                    println!("  {} [{}]", test.full_name, test.effective_tags.join(", "));
                });
            }
            Mode::Tags(wanted) => {
                let matching = filter_by_effective_tags(&result.structure, wanted.as_slice());
                if matching.is_empty() {
                    return;
                }
                self.header(path);
                for test in matching {
                    println!("  {}", test.full_name);
                }
            }
        }
    }

    fn header(&mut self, path: &Path) {
        if self.printed > 0 {
            println!();
        }
        self.printed += 1;
        println!("{}", path.display());
    }

    fn finish(&self, mode: &Mode) {
        match mode {
            Mode::Count => println!(
                "{} tests, {} pending in {} files",
                self.test_count, self.pending_test_count, self.files
            ),
            Mode::Json => match serde_json::to_string_pretty(&self.json) {
                Ok(text) => println!("{text}"),
                Err(e) => eprintln!("testmap: cannot serialize: {e}"),
            },
            _ => {}
        }
    }
}

/// Expand directories into the spec-like sources under them, honouring
/// ignore files. Plain file arguments are kept as given.
fn collect_files(args: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for arg in args {
        let path = Path::new(arg);
        if !path.is_dir() {
            files.push(path.to_path_buf());
            continue;
        }

        let walker = WalkBuilder::new(path)
            .hidden(true)
            .git_ignore(true)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();
        for entry in walker.flatten() {
            let file = entry.path();
            let is_spec = file
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(is_spec_extension);
            if file.is_file() && is_spec {
                files.push(file.to_path_buf());
            }
        }
    }
    files
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TESTMAP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_help() {
    eprintln!("testmap: outline of describe/it suites in spec files");
    eprintln!("Usage: testmap [options] <file|dir> [more ...]");
    eprintln!();
    eprintln!("Directories are searched for .ts/.tsx/.js/.jsx/.mts/.cts/.mjs/.cjs files.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --names              List describe and test names");
    eprintln!("  --json               Print the suite/test structure as JSON");
    eprintln!("  --effective          Show effective tags of every test");
    eprintln!("  --tags a,b           Show only tests whose effective tags match");
    eprintln!("  --count              Count tests and pending tests");
    eprintln!("  --suite-keyword K    Also treat K(...) as a suite");
    eprintln!("  --test-keyword K     Also treat K(...) as a test");
    eprintln!("  -h, --help           Show help");
    eprintln!();
    eprintln!("Set TESTMAP_LOG=debug to see how names and tags were resolved.");
}
