//! Per-file language classification.
//!
//! The engine only sees the [`Classifier`] trait. [`ExtensionClassifier`] is
//! the classifier shipped with the binary: file-name and extension tables, a
//! shebang lookup for extensionless scripts, and filters for binary and
//! vendored files. Its weight unit is bytes.

use std::path::Path;

/// The language assigned to one file and the weight it contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Display name of the language, e.g. `"Ruby"`.
    pub language: String,
    /// Contribution of the file to the language's total.
    pub weight: u64,
}

/// Assigns a language and a weight to a single file.
///
/// Implementations must be deterministic: the same path and content must
/// always produce the same classification, otherwise incremental results
/// drift away from full scans.
pub trait Classifier {
    /// Version tag of the classification rules. Embedded in the cache
    /// version so that changing the rules invalidates stored results.
    fn version(&self) -> &str;

    /// Classifies one file. `None` means the file does not count towards
    /// any language.
    fn classify(&self, path: &str, content: &[u8]) -> Option<Classification>;
}

/// Number of leading bytes inspected for NUL when detecting binary content.
const BINARY_SNIFF_LEN: usize = 8000;

/// Exact file names that identify a language regardless of extension.
const FILENAMES: &[(&str, &str)] = &[
    ("Makefile", "Makefile"),
    ("GNUmakefile", "Makefile"),
    ("Dockerfile", "Dockerfile"),
    ("Containerfile", "Dockerfile"),
    ("Rakefile", "Ruby"),
    ("Gemfile", "Ruby"),
    ("Vagrantfile", "Ruby"),
    ("CMakeLists.txt", "CMake"),
    ("BUILD.bazel", "Starlark"),
    ("Jenkinsfile", "Groovy"),
];

/// Extension (lowercase, without the dot) to language.
const EXTENSIONS: &[(&str, &str)] = &[
    ("rs", "Rust"),
    ("rb", "Ruby"),
    ("rake", "Ruby"),
    ("gemspec", "Ruby"),
    ("py", "Python"),
    ("pyi", "Python"),
    ("js", "JavaScript"),
    ("mjs", "JavaScript"),
    ("cjs", "JavaScript"),
    ("jsx", "JavaScript"),
    ("ts", "TypeScript"),
    ("tsx", "TSX"),
    ("go", "Go"),
    ("c", "C"),
    ("h", "C"),
    ("cc", "C++"),
    ("cpp", "C++"),
    ("cxx", "C++"),
    ("hpp", "C++"),
    ("hh", "C++"),
    ("m", "Objective-C"),
    ("mm", "Objective-C++"),
    ("java", "Java"),
    ("kt", "Kotlin"),
    ("kts", "Kotlin"),
    ("scala", "Scala"),
    ("swift", "Swift"),
    ("cs", "C#"),
    ("fs", "F#"),
    ("php", "PHP"),
    ("pl", "Perl"),
    ("pm", "Perl"),
    ("lua", "Lua"),
    ("hs", "Haskell"),
    ("ml", "OCaml"),
    ("mli", "OCaml"),
    ("ex", "Elixir"),
    ("exs", "Elixir"),
    ("erl", "Erlang"),
    ("clj", "Clojure"),
    ("dart", "Dart"),
    ("zig", "Zig"),
    ("nim", "Nim"),
    ("r", "R"),
    ("jl", "Julia"),
    ("sh", "Shell"),
    ("bash", "Shell"),
    ("zsh", "Shell"),
    ("fish", "fish"),
    ("ps1", "PowerShell"),
    ("sql", "SQL"),
    ("html", "HTML"),
    ("htm", "HTML"),
    ("css", "CSS"),
    ("scss", "SCSS"),
    ("less", "Less"),
    ("vue", "Vue"),
    ("svelte", "Svelte"),
    ("v", "Verilog"),
    ("sv", "SystemVerilog"),
    ("vhd", "VHDL"),
    ("vhdl", "VHDL"),
    ("tex", "TeX"),
    ("cmake", "CMake"),
    ("nix", "Nix"),
    ("tf", "HCL"),
    ("proto", "Protocol Buffer"),
    ("mk", "Makefile"),
];

/// Shebang interpreter (basename, version suffix stripped) to language.
const INTERPRETERS: &[(&str, &str)] = &[
    ("python", "Python"),
    ("ruby", "Ruby"),
    ("node", "JavaScript"),
    ("deno", "TypeScript"),
    ("sh", "Shell"),
    ("bash", "Shell"),
    ("zsh", "Shell"),
    ("dash", "Shell"),
    ("ksh", "Shell"),
    ("fish", "fish"),
    ("perl", "Perl"),
    ("php", "PHP"),
    ("lua", "Lua"),
    ("Rscript", "R"),
];

/// Path fragments that mark third-party or generated code.
const VENDORED_DIRS: &[&str] = &[
    "vendor/",
    "node_modules/",
    "third_party/",
    "bower_components/",
    "Godeps/_workspace/",
];

/// File-name suffixes that mark minified or generated code.
const GENERATED_SUFFIXES: &[&str] = &[".min.js", ".min.css", ".pb.go", "_pb2.py"];

/// The built-in classifier: name, extension, and shebang tables.
///
/// Binary files (a NUL byte in the first 8000 bytes), empty files, and
/// vendored or generated paths are not counted. The weight of a counted file
/// is its size in bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionClassifier;

impl ExtensionClassifier {
    /// Version tag of the built-in rules.
    pub const VERSION: &'static str = concat!("ext-", env!("CARGO_PKG_VERSION"));

    /// Creates the classifier.
    pub fn new() -> Self {
        Self
    }

    /// Returns the language for a path and its content, ignoring weight and
    /// the vendored/binary filters.
    pub fn detect_language(path: &str, content: &[u8]) -> Option<&'static str> {
        let file_name = path.rsplit('/').next().unwrap_or(path);

        if let Some(lang) = lookup(FILENAMES, file_name) {
            return Some(lang);
        }

        if let Some(ext) = Path::new(file_name).extension().and_then(|e| e.to_str()) {
            if let Some(lang) = lookup(EXTENSIONS, &ext.to_ascii_lowercase()) {
                return Some(lang);
            }
        }

        shebang_interpreter(content).and_then(|interp| lookup(INTERPRETERS, interp))
    }
}

impl Classifier for ExtensionClassifier {
    fn version(&self) -> &str {
        Self::VERSION
    }

    fn classify(&self, path: &str, content: &[u8]) -> Option<Classification> {
        if content.is_empty() || is_vendored(path) || is_binary(content) {
            return None;
        }
        let language = Self::detect_language(path, content)?;
        Some(Classification {
            language: language.to_string(),
            weight: content.len() as u64,
        })
    }
}

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, lang)| *lang)
}

/// Returns `true` for paths under vendored directories or with generated
/// suffixes.
pub fn is_vendored(path: &str) -> bool {
    let in_vendored_dir = VENDORED_DIRS
        .iter()
        .any(|dir| path.starts_with(dir) || path.contains(&format!("/{dir}")));
    in_vendored_dir || GENERATED_SUFFIXES.iter().any(|s| path.ends_with(s))
}

/// Returns `true` if the content looks binary.
pub fn is_binary(content: &[u8]) -> bool {
    let head = &content[..content.len().min(BINARY_SNIFF_LEN)];
    head.contains(&0)
}

/// Extracts the interpreter name from a `#!` line.
///
/// Handles `#!/usr/bin/env python3`, `#!/usr/bin/env -S node --flag`, and
/// direct paths like `#!/bin/bash`. Trailing version digits are stripped so
/// `python3.11` maps to `python`.
fn shebang_interpreter(content: &[u8]) -> Option<&str> {
    let rest = content.strip_prefix(b"#!")?;
    let line_end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
    let line = std::str::from_utf8(&rest[..line_end]).ok()?;

    let mut words = line.split_whitespace();
    let mut program = words.next()?;
    if program.rsplit('/').next() == Some("env") {
        program = words.find(|w| !w.starts_with('-'))?;
    }

    let base = program.rsplit('/').next()?;
    let trimmed = base.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(path: &str, content: &str) -> Option<String> {
        ExtensionClassifier::new()
            .classify(path, content.as_bytes())
            .map(|c| c.language)
    }

    #[test]
    fn extension_lookup() {
        assert_eq!(lang("src/main.rs", "fn main() {}").as_deref(), Some("Rust"));
        assert_eq!(lang("app/models/user.rb", "class User; end").as_deref(), Some("Ruby"));
        assert_eq!(lang("lib/index.JS", "x()").as_deref(), Some("JavaScript"));
    }

    #[test]
    fn filename_wins_over_extension() {
        assert_eq!(lang("CMakeLists.txt", "project(x)").as_deref(), Some("CMake"));
        assert_eq!(lang("build/Makefile", "all:").as_deref(), Some("Makefile"));
    }

    #[test]
    fn unknown_extension_is_unclassified() {
        assert_eq!(lang("notes.txt", "hello"), None);
        assert_eq!(lang("LICENSE", "MIT"), None);
    }

    #[test]
    fn shebang_env_and_direct() {
        assert_eq!(lang("bin/tool", "#!/usr/bin/env python3\nprint()").as_deref(), Some("Python"));
        assert_eq!(lang("bin/run", "#!/bin/bash\necho").as_deref(), Some("Shell"));
        assert_eq!(
            lang("bin/srv", "#!/usr/bin/env -S node --harmony\n").as_deref(),
            Some("JavaScript")
        );
        assert_eq!(lang("bin/x", "#!/usr/bin/python3.11\n").as_deref(), Some("Python"));
        assert_eq!(lang("bin/y", "#!\n"), None);
    }

    #[test]
    fn weight_is_byte_length() {
        let c = ExtensionClassifier::new()
            .classify("a.py", b"print('hi')\n")
            .unwrap();
        assert_eq!(c.weight, 12);
    }

    #[test]
    fn binary_and_empty_files_are_skipped() {
        let c = ExtensionClassifier::new();
        assert!(c.classify("image.c", b"\x89PNG\0\0").is_none());
        assert!(c.classify("empty.rs", b"").is_none());
    }

    #[test]
    fn vendored_paths_are_skipped() {
        assert!(is_vendored("vendor/lib/a.rb"));
        assert!(is_vendored("web/node_modules/x/index.js"));
        assert!(is_vendored("assets/app.min.js"));
        assert!(!is_vendored("src/vendored.rs"));
        assert_eq!(lang("vendor/a.rb", "puts 1"), None);
    }

    #[test]
    fn version_embeds_crate_version() {
        let c = ExtensionClassifier::new();
        assert!(c.version().starts_with("ext-"));
        assert_eq!(c.version(), ExtensionClassifier::VERSION);
    }
}
