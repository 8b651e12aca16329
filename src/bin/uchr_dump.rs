use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use dialoguer::Confirm;
use indoc::indoc;
use log::{Level, debug};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use uchr::{
    DecodeSettings, KeyStroke, KeyValue, KeyboardLayoutBundle, KeyboardType,
    NamedLayout, Resolution, ResolveError,
};

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Key codes of the four main rows of an ANSI keyboard, left to right.
const ANSI_ROWS: [&[u16]; 4] = [
    &[50, 18, 19, 20, 21, 23, 22, 26, 28, 25, 29, 27, 24],
    &[12, 13, 14, 15, 17, 16, 32, 34, 31, 35, 33, 30, 42],
    &[0, 1, 2, 3, 5, 4, 38, 40, 37, 41, 39],
    &[6, 7, 8, 9, 11, 45, 46, 43, 47, 44],
];

#[derive(Copy, Clone, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

struct UchrDump {
    settings: DecodeSettings,
    input: PathBuf,
    layout: Option<String>,
    modifiers: Option<u8>,
    output_format: OutputFormat,
    output: Box<dyn Write>,
    verbosity_level: Option<Level>,
}

impl UchrDump {
    pub fn from_cli_matches(matches: &ArgMatches) -> Result<Self> {
        let input = PathBuf::from(
            matches
                .get_one::<String>("INPUT")
                .context("missing INPUT argument")?,
        );

        let output_format = match matches.get_one::<String>("output-format").map(String::as_str) {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        };

        let verbosity_level = match matches.get_count("verbose") {
            0 => None,
            1 => Some(Level::Info),
            2 => Some(Level::Debug),
            3 => Some(Level::Trace),
            _ => {
                eprintln!("using more than -vvv does not affect verbosity level");
                Some(Level::Trace)
            }
        };

        let output: Box<dyn Write> = match matches.get_one::<String>("output-target") {
            Some(path) => {
                let file =
                    Self::create_output_file(path, !matches.get_flag("no-confirm-overwrite"))
                        .with_context(|| {
                            format!("An error occurred while creating output file at `{path}`")
                        })?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(BufWriter::new(io::stdout())),
        };

        Ok(UchrDump {
            settings: DecodeSettings::new()
                .lossy_text(matches.get_flag("lossy-text"))
                .strict_state_names(matches.get_flag("strict-state-names")),
            input,
            layout: matches.get_one::<String>("layout").cloned(),
            modifiers: matches.get_one::<u8>("modifiers").copied(),
            output_format,
            output,
            verbosity_level,
        })
    }

    /// Main entry point for `UchrDump`
    pub fn run(&mut self) -> Result<()> {
        self.try_to_initialize_logging();

        let data = fs::read(&self.input)
            .with_context(|| format!("Failed to open file {}", self.input.display()))?;
        let bundle = KeyboardLayoutBundle::parse_with_settings(&data, &self.settings)
            .with_context(|| format!("Failed to decode {}", self.input.display()))?;
        debug!("decoded {} layouts", bundle.layouts.len());

        let layout_name = self.layout.clone();
        match (layout_name.as_deref(), self.output_format) {
            (None, OutputFormat::Text) => self.dump_list(&bundle)?,
            (None, OutputFormat::Json) => {
                serde_json::to_writer_pretty(&mut self.output, &bundle)?;
                writeln!(self.output)?;
            }
            (Some(name), format) => {
                let layout = bundle
                    .layout(name)
                    .with_context(|| format!("No layout named `{name}` in the input"))?;
                match format {
                    OutputFormat::Text => self.dump_grid(layout)?,
                    OutputFormat::Json => {
                        serde_json::to_writer_pretty(&mut self.output, layout)?;
                        writeln!(self.output)?;
                    }
                }
            }
        }

        self.output.flush()?;
        Ok(())
    }

    fn dump_list(&mut self, bundle: &KeyboardLayoutBundle) -> Result<()> {
        for layout in &bundle.layouts {
            writeln!(
                self.output,
                "{:>6}  {}  ({} keyboard types)",
                layout.number,
                layout.name,
                layout.resource.entries.len()
            )?;
        }
        Ok(())
    }

    fn dump_grid(&mut self, layout: &NamedLayout) -> Result<()> {
        let Some(keyboard) = layout.resource.entries.first() else {
            bail!("Layout `{}` has no keyboard types", layout.name);
        };

        let table_index = match self.modifiers {
            Some(modifiers) => keyboard.modifier_table.table_index(modifiers),
            None => usize::from(keyboard.modifier_table.default_table_index),
        };
        let Some(table) = keyboard.code_table.table(table_index) else {
            bail!(
                "Modifier table selects code table {}, but layout `{}` has {}",
                table_index,
                layout.name,
                keyboard.code_table.tables.len()
            );
        };

        for row in ANSI_ROWS {
            let keys: Vec<String> = row
                .iter()
                .map(|&code| match table.get(usize::from(code)) {
                    Some(&raw) => render_value(keyboard, raw),
                    None => "-".to_string(),
                })
                .collect();
            writeln!(self.output, "{}", keys.join(" "))?;
        }
        Ok(())
    }

    /// If `prompt` is passed, will display a confirmation prompt before overwriting files.
    fn create_output_file(path: impl AsRef<Path>, prompt: bool) -> Result<File> {
        let p = path.as_ref();

        if p.is_dir() {
            bail!(
                "There is a directory at {}, refusing to overwrite",
                p.display()
            );
        }

        if p.exists() && prompt {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Are you sure you want to override output file at {}",
                    p.display()
                ))
                .default(false)
                .interact()
                .context("Failed to write confirmation prompt to term")?;
            if !confirmed {
                bail!("Cancelled");
            }
        }

        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        Ok(File::create(p)?)
    }

    fn try_to_initialize_logging(&self) {
        if let Some(level) = self.verbosity_level {
            if let Err(e) = TermLogger::init(
                level.to_level_filter(),
                Config::default(),
                TerminalMode::Stderr,
                ColorChoice::Auto,
            ) {
                eprintln!("Failed to initialize logging: {e}");
            }
        }
    }
}

/// One grid cell: literals as characters, dead keys as their default output followed by the
/// outputs of their transitions in brackets.
fn render_value(keyboard: &KeyboardType, raw: u16) -> String {
    let settled = settle(keyboard, raw);
    let KeyValue::DeadKey(state) = KeyValue::classify(raw) else {
        return render_resolution(settled);
    };

    let targets: String = keyboard
        .state_index
        .as_ref()
        .and_then(|states| states.get(state))
        .and_then(|record| record.transitions.as_ref())
        .into_iter()
        .flatten()
        .map(|t| render_resolution(settle(keyboard, t.target)))
        .collect();

    format!("{}[{}]", render_resolution(settled), targets)
}

/// Resolve `raw` without any follow-up stroke.
fn settle(keyboard: &KeyboardType, raw: u16) -> std::result::Result<Resolution, ResolveError> {
    keyboard
        .resolve_value(raw, None::<KeyStroke>)
        .map(|c| c.output)
}

fn render_resolution(resolved: std::result::Result<Resolution, ResolveError>) -> String {
    match resolved {
        Ok(Resolution::Literal(cp)) => match char::from_u32(u32::from(cp)) {
            Some(c) if !c.is_control() => c.to_string(),
            _ => format!("U+{cp:04X}"),
        },
        Ok(Resolution::Action(marker)) => format!("<action {marker}>"),
        Err(e) => {
            debug!("unresolvable key: {e}");
            "?".to_string()
        }
    }
}

fn main() -> Result<()> {
    let matches = Command::new("uchr_dump")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Utility to inspect keyboard layout containers")
        .long_about(indoc!(r#"
            Utility to inspect keyboard layout containers (`*.dat` files holding `uchr` resources).

            Without `--layout`, lists every layout in the container.
            With `--layout NAME`, prints the main key rows of that layout's first keyboard type.
        "#))
        .arg(Arg::new("INPUT").required(true))
        .arg(
            Arg::new("layout")
                .long("layout")
                .short('l')
                .value_name("NAME")
                .help("Print the key grid (or JSON, with `-o json`) of the named layout."),
        )
        .arg(
            Arg::new("modifiers")
                .long("modifiers")
                .short('m')
                .value_name("N")
                .value_parser(clap::value_parser!(u8))
                .help("Modifier combination code used for the key grid, defaults to the layout's default table."),
        )
        .arg(
            Arg::new("output-format")
                .short('o')
                .long("format")
                .value_parser(["text", "json"])
                .default_value("text")
                .help("Sets the output format"),
        )
        .arg(
            Arg::new("output-target")
                .long("output")
                .short('f')
                .value_name("FILE")
                .help("Writes output to the file specified instead of stdout, errors will still be printed to stderr. \
                       Will ask for confirmation before overwriting files, to allow overwriting, pass `--no-confirm-overwrite`. \
                       Will create parent directories if needed."),
        )
        .arg(
            Arg::new("no-confirm-overwrite")
                .long("no-confirm-overwrite")
                .action(ArgAction::SetTrue)
                .help("When set, will not ask for confirmation before overwriting files, useful for automation"),
        )
        .arg(
            Arg::new("lossy-text")
                .long("lossy-text")
                .action(ArgAction::SetTrue)
                .help("Replace invalid UTF-16 in state names with U+FFFD instead of failing."),
        )
        .arg(
            Arg::new("strict-state-names")
                .long("strict-state-names")
                .action(ArgAction::SetTrue)
                .help("Fail when a keyboard type has a different number of state names than state records."),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("-v - info, -vv - debug, -vvv - trace."),
        )
        .get_matches();

    let mut app = UchrDump::from_cli_matches(&matches)?;
    app.run()
}
