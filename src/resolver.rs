//! The resolver: one configuration, three layers.
//!
//! ```text
//! Compiled defaults      values passed to Resolver::builder()
//!        ↑ overridden by
//! Config file            default path, or the one named by `-f <path>`
//!        ↑ overridden by
//! Command-line flags     -name value
//! ```
//!
//! [`Resolver::read`] runs the file layer and then the argument layer, always
//! both, and reports their failures separately in a [`ReadOutcome`]. A missing
//! or broken file therefore never blocks a fully specified command line.

use std::path::{Path, PathBuf};

use confique::Config;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::binder;
use crate::codec;
use crate::error::{ArgError, CodecError, FileError, SetupError};
use crate::file;
use crate::layer;
use crate::schema::FlagSchema;
use crate::types::ReadOutcome;

/// Flag that names an alternate config file, unless overridden with
/// [`ResolverBuilder::override_flag`].
pub const DEFAULT_OVERRIDE_FLAG: &str = "-f";

const BUFFER_SOURCE: &str = "<buffer>";

/// Builder for a [`Resolver`].
pub struct ResolverBuilder<C> {
    defaults: C,
    file_path: Option<PathBuf>,
    override_flag: String,
    use_file: bool,
    strict: bool,
}

impl<C> ResolverBuilder<C>
where
    C: Config + Serialize + DeserializeOwned,
    C::Layer: DeserializeOwned,
{
    fn new(defaults: C) -> Self {
        Self {
            defaults,
            file_path: None,
            override_flag: DEFAULT_OVERRIDE_FLAG.to_string(),
            use_file: true,
            strict: true,
        }
    }

    /// Default config file. Without one, file loading is disabled entirely
    /// and the override flag is not recognized. With one, the override flag
    /// is recognized even when [`use_file`](Self::use_file) is off.
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Use `{platform config dir}/{file_name}` for `app_name` as the default
    /// config file. Leaves file loading disabled if the platform has no home
    /// directory.
    pub fn platform_file(mut self, app_name: &str, file_name: &str) -> Self {
        self.file_path = file::platform_config_path(app_name, file_name);
        self
    }

    /// Token that names an alternate config file (default: `-f`).
    pub fn override_flag(mut self, flag: &str) -> Self {
        self.override_flag = flag.to_string();
        self
    }

    /// Enable or disable reading the config file (default: `true`).
    pub fn use_file(mut self, use_file: bool) -> Self {
        self.use_file = use_file;
        self
    }

    /// Enable or disable strict mode (default: `true`).
    ///
    /// In strict mode a single unknown key in the config file is a
    /// [`FileError::UnknownKeys`] and **none** of the file's values are
    /// applied, even those for known keys. Turn it off when files may carry
    /// keys for other tools or newer versions; unknown keys are then ignored.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn build(self) -> Result<Resolver<C>, SetupError> {
        let schema = FlagSchema::for_config(&self.defaults)?;
        Ok(Resolver {
            config: self.defaults,
            file_path: self.file_path,
            override_flag: self.override_flag,
            use_file: self.use_file,
            strict: self.strict,
            schema,
            trailing: Vec::new(),
        })
    }
}

/// Resolves one configuration value from defaults, a config file and
/// command-line arguments.
#[derive(Debug)]
pub struct Resolver<C> {
    config: C,
    file_path: Option<PathBuf>,
    override_flag: String,
    use_file: bool,
    strict: bool,
    schema: FlagSchema,
    trailing: Vec<String>,
}

impl<C> Resolver<C>
where
    C: Config + Serialize + DeserializeOwned,
    C::Layer: DeserializeOwned,
{
    pub fn builder(defaults: C) -> ResolverBuilder<C> {
        ResolverBuilder::new(defaults)
    }

    /// Start from the `#[config(default)]` values of `C`. Fails if `C` has a
    /// required field without a default.
    pub fn builder_with_defaults() -> Result<ResolverBuilder<C>, SetupError> {
        let defaults = C::builder().load()?;
        Ok(ResolverBuilder::new(defaults))
    }

    /// A resolver with no config file support.
    pub fn new(defaults: C) -> Result<Self, SetupError> {
        Self::builder(defaults).build()
    }

    /// Resolve the configuration from `args`.
    ///
    /// 1. If a default file path is configured, pull `<override_flag> <path>`
    ///    out of `args` (first occurrence only) or fall back to the default
    ///    path.
    /// 2. Unless `use_file` is off, read and decode that file on top of the
    ///    current values.
    /// 3. Apply the remaining arguments on top, whatever happened in 2.
    ///
    /// Nothing is printed. A help token (`-?`, `-h`, `-help`) comes back as
    /// [`ArgError::HelpRequested`]; the caller is expected to show
    /// [`print_usage`](Self::print_usage) or [`usage_text`](Self::usage_text)
    /// and exit. [`ActionRegistry`](crate::ActionRegistry) does this itself.
    pub fn read<I, S>(&mut self, args: I) -> ReadOutcome
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut outcome = ReadOutcome::default();

        if let Some(path) = self.effective_path(&mut args) {
            debug!(path = %path.display(), "loading config file");
            outcome.file_error = self.load_file(&path).err();
        }
        outcome.arg_error = self.apply_args(&args).err();
        outcome
    }

    /// [`read`](Self::read) over the process arguments, program name excluded.
    pub fn read_cmdline(&mut self) -> ReadOutcome {
        self.read(std::env::args().skip(1))
    }

    /// The resolved configuration.
    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut C {
        &mut self.config
    }

    pub fn into_config(self) -> C {
        self.config
    }

    /// Positional tokens left after flag parsing stopped in the last `read`.
    pub fn trailing_args(&self) -> &[String] {
        &self.trailing
    }

    pub fn schema(&self) -> &FlagSchema {
        &self.schema
    }

    /// Default config file path, if file support is configured.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Whether `read` will look at a config file at all.
    pub fn file_enabled(&self) -> bool {
        self.use_file && self.file_path.is_some()
    }

    /// Per-flag usage followed, when file support is on, by the override
    /// flag line. Every line starts with `prefix`.
    pub fn usage_text(&self, prefix: &str) -> String {
        let mut out = self.schema.usage(prefix);
        if let Some(path) = self.file_path.as_ref().filter(|_| self.use_file) {
            out.push_str(&format!(
                "{prefix}{} <filepath> : read configuration from <filepath>\n",
                self.override_flag
            ));
            out.push_str(&format!("{prefix}    default: {}\n", path.display()));
        }
        out
    }

    /// Print usage to stdout.
    pub fn print_usage(&self) {
        print!("Usage:\n{}", self.usage_text("  "));
    }

    /// Decode TOML `content` onto the current configuration, the same way a
    /// config file is applied (strict mode included). Errors name the source
    /// as `<buffer>`.
    pub fn unmarshal(&mut self, content: &str) -> Result<(), FileError> {
        self.apply_content(content, Path::new(BUFFER_SOURCE))
    }

    /// The current configuration as a TOML document.
    pub fn marshal(&self) -> Result<String, CodecError> {
        codec::encode(&self.config)
    }

    /// Commented TOML template for `C`.
    pub fn template(&self) -> String {
        codec::template::<C>()
    }

    /// Write the current configuration to `path`. An existing file keeps its
    /// comments; a new one is seeded from the template.
    pub fn save(&self, path: &Path) -> Result<(), CodecError> {
        let existing = file::read_existing(path)?;
        let content = codec::patch_document(existing.as_deref(), &self.config, path)?;
        file::write_file(path, &content)
    }

    /// The override pair is stripped whenever a default path is configured,
    /// even with `use_file` off, so it never reaches the binder.
    fn effective_path(&self, args: &mut Vec<String>) -> Option<PathBuf> {
        let default = self.file_path.as_ref()?;
        let path = take_override(args, &self.override_flag)
            .map(PathBuf::from)
            .unwrap_or_else(|| default.clone());
        self.use_file.then_some(path)
    }

    fn load_file(&mut self, path: &Path) -> Result<(), FileError> {
        let content = file::read_config_file(path)?;
        self.apply_content(&content, path)
    }

    fn apply_content(&mut self, content: &str, path: &Path) -> Result<(), FileError> {
        let table = codec::decode::<C>(content, path, self.strict)?;
        layer::apply(&mut self.config, table).map_err(|source| FileError::Apply {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_args(&mut self, args: &[String]) -> Result<(), ArgError> {
        self.trailing.clear();
        let bound = binder::bind(&self.schema, args)?;
        self.trailing = bound.trailing;
        let table = layer::overrides_to_table(&bound.overrides);
        layer::apply(&mut self.config, table).map_err(ArgError::Apply)
    }
}

/// Remove the first `flag <value>` pair from `args` and return the value. A
/// trailing `flag` with nothing after it is left in place.
fn take_override(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    if pos + 1 >= args.len() {
        return None;
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{Employee, Shift};
    use std::fs;
    use tempfile::TempDir;
    use toml::value::Datetime;

    const NO_ARGS: [&str; 0] = [];

    const FILE: &str = r#"
name = "nameFromFile"
addr = "addrFromFile"

[employer]
name = "comFromFile"
"#;

    fn with_file(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("employee.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    fn resolver_for(path: &Path) -> Resolver<Employee> {
        Resolver::builder(Employee::defaults())
            .file_path(path)
            .build()
            .unwrap()
    }

    #[test]
    fn take_override_removes_pair() {
        let mut args = vec!["-name".to_string(), "x".into(), "-f".into(), "p.toml".into()];
        assert_eq!(take_override(&mut args, "-f").as_deref(), Some("p.toml"));
        assert_eq!(args, vec!["-name".to_string(), "x".into()]);
    }

    #[test]
    fn take_override_first_occurrence_only() {
        let mut args: Vec<String> = ["-f", "a", "-f", "b"].map(String::from).to_vec();
        assert_eq!(take_override(&mut args, "-f").as_deref(), Some("a"));
        assert_eq!(args, vec!["-f".to_string(), "b".into()]);
    }

    #[test]
    fn take_override_ignores_trailing_flag() {
        let mut args: Vec<String> = ["-name", "x", "-f"].map(String::from).to_vec();
        assert_eq!(take_override(&mut args, "-f"), None);
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn defaults_only_without_file() {
        let mut r = Resolver::new(Employee::defaults()).unwrap();
        let outcome = r.read(NO_ARGS);
        assert!(outcome.is_clean());
        assert_eq!(r.config(), &Employee::defaults());
    }

    #[test]
    fn file_values_override_defaults() {
        let (_dir, path) = with_file(FILE);
        let mut r = resolver_for(&path);
        let outcome = r.read(NO_ARGS);
        assert!(outcome.is_clean(), "{outcome:?}");
        assert_eq!(r.config().name, "nameFromFile");
        assert_eq!(r.config().addr, "addrFromFile");
        assert_eq!(r.config().employer.name, "comFromFile");
        assert_eq!(r.config().years, 1);
    }

    #[test]
    fn args_override_file() {
        let (_dir, path) = with_file(FILE);
        let mut r = resolver_for(&path);
        let outcome = r.read(["-name", "nameFromArg"]);
        assert!(outcome.is_clean());
        assert_eq!(r.config().name, "nameFromArg");
        assert_eq!(r.config().addr, "addrFromFile");
    }

    #[test]
    fn override_flag_names_alternate_file() {
        let (_dir, path) = with_file(FILE);
        let mut r = Resolver::builder(Employee::defaults())
            .file_path("somenonexistingfilepath")
            .build()
            .unwrap();
        let outcome = r.read(["-f", path.to_str().unwrap()]);
        assert!(outcome.is_clean(), "{outcome:?}");
        assert_eq!(r.config().name, "nameFromFile");
    }

    #[test]
    fn custom_override_flag() {
        let (_dir, path) = with_file(FILE);
        let mut r = Resolver::builder(Employee::defaults())
            .file_path("absent.toml")
            .override_flag("-config")
            .build()
            .unwrap();
        let outcome = r.read(["-config", path.to_str().unwrap(), "-years", "4"]);
        assert!(outcome.is_clean(), "{outcome:?}");
        assert_eq!(r.config().name, "nameFromFile");
        assert_eq!(r.config().years, 4);
    }

    #[test]
    fn missing_override_file_keeps_defaults_and_applies_args() {
        let (_dir, path) = with_file(FILE);
        let mut r = resolver_for(&path);
        let outcome = r.read(["-f", "doesntexist", "-addr", "addrFromArg"]);
        assert!(matches!(outcome.file_error, Some(FileError::Read { .. })));
        assert!(outcome.arg_error.is_none());
        assert_eq!(r.config().name, "defName");
        assert_eq!(r.config().addr, "addrFromArg");
        assert_eq!(r.config().employer.name, "defCom");
    }

    #[test]
    fn override_flag_without_file_support_is_unknown() {
        let mut r = Resolver::new(Employee::defaults()).unwrap();
        let outcome = r.read(["-f", "x.toml"]);
        assert!(outcome.file_error.is_none());
        assert!(matches!(outcome.arg_error, Some(ArgError::UnknownFlag(f)) if f == "f"));
    }

    #[test]
    fn trailing_override_flag_is_left_for_binder() {
        let (_dir, path) = with_file(FILE);
        let mut r = resolver_for(&path);
        let outcome = r.read(["-name", "x", "-f"]);
        assert!(outcome.file_error.is_none());
        assert!(matches!(outcome.arg_error, Some(ArgError::UnknownFlag(f)) if f == "f"));
        assert_eq!(r.config().name, "nameFromFile");
    }

    #[test]
    fn use_file_false_never_reads() {
        let (_dir, path) = with_file(FILE);
        let mut r = Resolver::builder(Employee::defaults())
            .file_path(&path)
            .use_file(false)
            .build()
            .unwrap();
        let outcome = r.read(NO_ARGS);
        assert!(outcome.is_clean());
        assert_eq!(r.config().name, "defName");
        assert!(!r.file_enabled());
    }

    #[test]
    fn use_file_false_still_strips_override_pair() {
        let (_dir, path) = with_file(FILE);
        let mut r = Resolver::builder(Employee::defaults())
            .file_path("default.toml")
            .use_file(false)
            .build()
            .unwrap();
        let outcome = r.read(["-f", path.to_str().unwrap(), "-name", "x"]);
        assert!(outcome.is_clean(), "{outcome:?}");
        assert_eq!(r.config().name, "x");
        assert_eq!(r.config().addr, "defAddr");
        assert!(r.trailing_args().is_empty());
    }

    #[test]
    fn unmarshal_applies_buffer() {
        let mut r = Resolver::new(Employee::defaults()).unwrap();
        r.unmarshal(FILE).unwrap();
        assert_eq!(r.config().name, "nameFromFile");
        assert_eq!(r.config().employer.name, "comFromFile");
        assert_eq!(r.config().years, 1);
    }

    #[test]
    fn unmarshal_round_trips_marshal() {
        let mut source = Resolver::new(Shift::defaults()).unwrap();
        source.read(["-start", "2016-12-02T12:03:04Z", "-rate", "2.5"]);
        let text = source.marshal().unwrap();

        let mut target = Resolver::new(Shift::defaults()).unwrap();
        target.unmarshal(&text).unwrap();
        assert_eq!(target.config(), source.config());
    }

    #[test]
    fn unmarshal_honours_strict_mode() {
        let mut strict = Resolver::new(Employee::defaults()).unwrap();
        match strict.unmarshal("name = \"x\"\ntypo = 1\n") {
            Err(FileError::UnknownKeys { path, keys }) => {
                assert_eq!(path, Path::new("<buffer>"));
                assert_eq!(keys[0].key, "typo");
            }
            other => panic!("Expected UnknownKeys, got {other:?}"),
        }
        assert_eq!(strict.config().name, "defName");

        let mut lenient = Resolver::builder(Employee::defaults())
            .strict(false)
            .build()
            .unwrap();
        lenient.unmarshal("name = \"x\"\ntypo = 1\n").unwrap();
        assert_eq!(lenient.config().name, "x");
    }

    #[test]
    fn unmarshal_bad_toml_is_decode_error() {
        let mut r = Resolver::new(Employee::defaults()).unwrap();
        assert!(matches!(r.unmarshal("name = "), Err(FileError::Decode { .. })));
    }

    #[test]
    fn strict_drops_whole_file_for_one_extra_key() {
        let (_dir, path) = with_file(&format!("{FILE}\n[extra]\nowner = \"ops\"\n"));
        let mut r = resolver_for(&path);
        let outcome = r.read(["-years", "3"]);
        assert!(matches!(outcome.file_error, Some(FileError::UnknownKeys { .. })));
        assert_eq!(r.config().name, "defName");
        assert_eq!(r.config().years, 3);
    }

    #[test]
    fn decode_error_and_arg_error_reported_together() {
        let (_dir, path) = with_file("name = \n");
        let mut r = resolver_for(&path);
        let outcome = r.read(["-nope", "x"]);
        assert!(matches!(outcome.file_error, Some(FileError::Decode { .. })));
        assert!(matches!(outcome.arg_error, Some(ArgError::UnknownFlag(_))));
    }

    #[test]
    fn decode_error_still_applies_args() {
        let (_dir, path) = with_file("this is not toml");
        let mut r = resolver_for(&path);
        let outcome = r.read(["-name", "fromArg"]);
        assert!(outcome.file_error.is_some());
        assert!(outcome.arg_error.is_none());
        assert_eq!(r.config().name, "fromArg");
    }

    #[test]
    fn strict_rejects_unknown_key_and_skips_file() {
        let (_dir, path) = with_file("name = \"fromFile\"\ntypo = 1\n");
        let mut r = resolver_for(&path);
        let outcome = r.read(NO_ARGS);
        assert!(matches!(outcome.file_error, Some(FileError::UnknownKeys { .. })));
        assert_eq!(r.config().name, "defName");
    }

    #[test]
    fn lenient_ignores_unknown_key() {
        let (_dir, path) = with_file("name = \"fromFile\"\ntypo = 1\n");
        let mut r = Resolver::builder(Employee::defaults())
            .file_path(&path)
            .strict(false)
            .build()
            .unwrap();
        let outcome = r.read(NO_ARGS);
        assert!(outcome.is_clean(), "{outcome:?}");
        assert_eq!(r.config().name, "fromFile");
    }

    #[test]
    fn lenient_type_mismatch_is_apply_error() {
        let (_dir, path) = with_file("name = \"fromFile\"\nyears = \"many\"\n");
        let mut r = Resolver::builder(Employee::defaults())
            .file_path(&path)
            .strict(false)
            .build()
            .unwrap();
        let outcome = r.read(NO_ARGS);
        assert!(matches!(outcome.file_error, Some(FileError::Apply { .. })));
        assert_eq!(r.config(), &Employee::defaults());
    }

    #[test]
    fn arg_error_applies_no_arguments() {
        let mut r = Resolver::new(Employee::defaults()).unwrap();
        let outcome = r.read(["-name", "x", "-years", "many"]);
        assert!(matches!(outcome.arg_error, Some(ArgError::InvalidValue { .. })));
        assert_eq!(r.config().name, "defName");
    }

    #[test]
    fn optional_field_type_mismatch_is_apply_error() {
        let mut r = Resolver::new(Employee::defaults()).unwrap();
        let outcome = r.read(["-badge", "42"]);
        assert!(matches!(outcome.arg_error, Some(ArgError::Apply(_))));
        assert_eq!(r.config().badge, None);
    }

    #[test]
    fn nested_list_and_bool_flags() {
        let mut r = Resolver::new(Employee::defaults()).unwrap();
        let outcome = r.read([
            "-employer-name",
            "argCom",
            "-num_list",
            "7,8",
            "-retired",
            "-badge",
            "B-1",
        ]);
        assert!(outcome.is_clean(), "{outcome:?}");
        let c = r.config();
        assert_eq!(c.employer.name, "argCom");
        assert_eq!(c.num_list, vec![7, 8]);
        assert!(c.retired);
        assert_eq!(c.badge.as_deref(), Some("B-1"));
    }

    #[test]
    fn datetime_flag_overrides_default() {
        let mut r = Resolver::new(Shift::defaults()).unwrap();
        let outcome = r.read(["-start", "2016-12-02T12:03:04Z"]);
        assert!(outcome.is_clean(), "{outcome:?}");
        let expected: Datetime = "2016-12-02T12:03:04Z".parse().unwrap();
        assert_eq!(r.config().start, expected);
    }

    #[test]
    fn trailing_args_are_kept() {
        let mut r = Resolver::new(Employee::defaults()).unwrap();
        let outcome = r.read(["-name", "x", "input.txt", "out.txt"]);
        assert!(outcome.is_clean());
        assert_eq!(r.trailing_args(), ["input.txt", "out.txt"]);
    }

    #[test]
    fn help_is_arg_error() {
        let mut r = Resolver::new(Employee::defaults()).unwrap();
        let outcome = r.read(["-?"]);
        assert!(matches!(outcome.arg_error, Some(ArgError::HelpRequested)));
    }

    #[test]
    fn builder_with_compiled_defaults() {
        let r = Resolver::<Employee>::builder_with_defaults()
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(r.config(), &Employee::defaults());
    }

    #[test]
    fn builder_with_defaults_fails_on_required_field() {
        let result = Resolver::<Shift>::builder_with_defaults();
        assert!(matches!(result, Err(SetupError::Defaults(_))));
    }

    #[test]
    fn platform_file_sets_default_path() {
        let r = Resolver::builder(Employee::defaults())
            .platform_file("layerconf-test", "employee.toml")
            .build()
            .unwrap();
        if let Some(path) = r.file_path() {
            assert!(path.ends_with("employee.toml"));
        }
    }

    #[test]
    fn usage_lists_fields_then_override_flag() {
        let r = Resolver::builder(Employee::defaults())
            .file_path("./employee.toml")
            .build()
            .unwrap();
        let usage = r.usage_text("  ");
        let name_at = usage.find("  -name <string>").unwrap();
        let file_at = usage
            .find("  -f <filepath> : read configuration from <filepath>\n      default: ./employee.toml\n")
            .unwrap();
        assert!(name_at < file_at);
        assert!(usage.ends_with("default: ./employee.toml\n"));
    }

    #[test]
    fn usage_without_file_support_has_no_override_line() {
        let r = Resolver::new(Employee::defaults()).unwrap();
        assert!(!r.usage_text("").contains("<filepath>"));
        let disabled = Resolver::builder(Employee::defaults())
            .file_path("x.toml")
            .use_file(false)
            .build()
            .unwrap();
        assert!(!disabled.usage_text("").contains("<filepath>"));
    }

    #[test]
    fn usage_is_idempotent() {
        let r = Resolver::builder(Employee::defaults())
            .file_path("x.toml")
            .build()
            .unwrap();
        assert_eq!(r.usage_text("  "), r.usage_text("  "));
    }

    #[test]
    fn marshal_renders_resolved_values() {
        let mut r = Resolver::new(Employee::defaults()).unwrap();
        r.read(["-name", "marshalled"]);
        let text = r.marshal().unwrap();
        assert!(text.contains("name = \"marshalled\""));
        assert!(text.contains("[employer]"));
    }

    #[test]
    fn save_then_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved").join("employee.toml");

        let mut writer = Resolver::new(Employee::defaults()).unwrap();
        writer.read(["-addr", "savedAddr"]);
        writer.save(&path).unwrap();

        let mut reader = resolver_for(&path);
        let outcome = reader.read(NO_ARGS);
        assert!(outcome.is_clean(), "{outcome:?}");
        assert_eq!(reader.config().addr, "savedAddr");
    }
}
