mod ai;
mod app;
mod config;
mod editor;
mod error;
mod event;
mod links;
mod notes;
mod search;
mod templates;
mod ui;

use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::fs::{self, OpenOptions};
use std::io;
use std::process;
use std::sync::Mutex;

use chrono::Local;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use ai::{AiWorker, Gateway, NoteContext};
use app::App;
use config::Config;
use event::run_app;
use notes::{Note, Store};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const LOG_ENV: &str = "GROVE_LOG";

fn print_help() {
    println!("grove {}", VERSION);
    println!("Your knowledge garden in the terminal");
    println!();
    println!("USAGE:");
    println!("    grove                              Open the TUI");
    println!("    grove new [--template T] <title>   Create a note and open it in $EDITOR");
    println!("    grove today                        Open today's daily note in $EDITOR");
    println!("    grove add <text>                   Append a quick thought to today's note");
    println!("    grove search <query>               Search notes (non-interactive)");
    println!("    grove list                         List all notes");
    println!("    grove ask <question>               Ask AI about your entire vault");
    println!("    grove stats                        Show vault statistics");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
    println!("    -c, --config     Print config file path");
    println!("    -d, --dir        Print notes directory path");
    println!();
    println!("TEMPLATES:");
    println!("    {}", templates::NAMES.join(", "));
    println!();
    println!("TUI KEYS:");
    println!("    j/k navigate   Enter open   n new   N new with template   t today");
    println!("    / search       d delete     e edit  A ask AI              @ vault AI");
    println!("    L links        ? help       q quit");
}

fn die(msg: impl Display) -> ! {
    eprintln!("grove: {}", msg);
    process::exit(1);
}

/// Log to `<cache>/grove/grove.log`; the terminal belongs to the UI.
fn init_logging() {
    let Some(dir) = dirs::cache_dir().map(|d| d.join("grove")) else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(dir.join("grove.log")) else {
        return;
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("grove=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

/// Pull `--template T`, `-t T` or `--template=T` out of `args`, returning the
/// template name and the remaining words.
fn parse_new_args(args: &[String]) -> Result<(String, Vec<String>), String> {
    let mut template = "default".to_string();
    let mut rest = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--template" || arg == "-t" {
            match iter.next() {
                Some(name) => template = name.clone(),
                None => {
                    return Err(format!(
                        "--template requires a name ({})",
                        templates::NAMES.join(", ")
                    ))
                }
            }
        } else if let Some(name) = arg.strip_prefix("--template=") {
            template = name.to_string();
        } else {
            rest.push(arg.clone());
        }
    }
    Ok((template, rest))
}

fn cmd_new(config: &Config, store: &Store, args: &[String]) {
    let (template, words) = parse_new_args(args).unwrap_or_else(|e| die(e));
    let title = words.join(" ");
    if title.is_empty() {
        die("usage: grove new [--template T] <title>");
    }

    let mut note = store.create(&title, &[]).unwrap_or_else(|e| die(format!("create: {}", e)));
    let date = Local::now().format("%Y-%m-%d").to_string();
    note.body = templates::render(&template, &note.title, &date);
    if let Err(e) = store.save(&mut note) {
        die(format!("save: {}", e));
    }
    if let Err(e) = editor::run(&config.editor, &note.path) {
        die(format!("editor: {}", e));
    }
}

fn cmd_today(config: &Config, store: &Store) {
    let note = store.create_daily().unwrap_or_else(|e| die(format!("daily: {}", e)));
    if let Err(e) = editor::run(&config.editor, &note.path) {
        die(format!("editor: {}", e));
    }
}

fn cmd_add(store: &Store, text: &str) {
    if text.is_empty() {
        die("usage: grove add <text>");
    }
    let note = store
        .append_to_daily(text, Local::now().naive_local())
        .unwrap_or_else(|e| die(format!("append: {}", e)));
    println!("added to {}", note.id);
}

fn load_notes(store: &Store) -> Vec<Note> {
    store.load_all().unwrap_or_else(|e| die(format!("load notes: {}", e)))
}

fn cmd_list(store: &Store) {
    for note in load_notes(store) {
        println!("{:<40}  {}", note.id, note.title);
    }
}

/// Case-insensitive substring match over title, tags and body.
fn matching_notes<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    let query = query.to_lowercase();
    notes
        .iter()
        .filter(|n| n.haystack().to_lowercase().contains(&query))
        .collect()
}

fn cmd_search(store: &Store, query: &str) {
    if query.is_empty() {
        die("usage: grove search <query>");
    }
    let notes = load_notes(store);
    let found = matching_notes(&notes, query);
    for note in &found {
        println!("{:<40}  {}", note.id, note.title);
    }
    if found.is_empty() {
        eprintln!("no notes match {:?}", query);
        process::exit(1);
    }
}

fn cmd_ask(config: &Config, store: &Store, question: &str) {
    if question.is_empty() {
        die("usage: grove ask <question>");
    }
    let gateway = Gateway::new(config);
    if !gateway.available() {
        die(error::Error::ConfigurationMissing);
    }
    let notes = load_notes(store);
    let context: Vec<NoteContext> = notes.iter().map(NoteContext::from).collect();
    match gateway.ask_vault(&context, question) {
        Ok(answer) => println!("{}", answer),
        Err(e) => die(format!("AI error: {}", e)),
    }
}

#[derive(Debug, PartialEq)]
struct VaultStats {
    notes: usize,
    words: usize,
    oldest: String,
    newest: String,
    top_tags: Vec<(String, usize)>,
}

fn vault_stats(notes: &[Note]) -> Option<VaultStats> {
    let first = notes.first()?;
    let mut oldest = first;
    let mut newest = first;
    let mut words = 0;
    let mut tag_counts: HashMap<&str, usize> = HashMap::new();

    for note in notes {
        words += ui::word_count(&note.body);
        for tag in &note.tags {
            *tag_counts.entry(tag.as_str()).or_default() += 1;
        }
        if note.created < oldest.created {
            oldest = note;
        }
        if note.created > newest.created {
            newest = note;
        }
    }

    let mut top_tags: Vec<(String, usize)> = tag_counts
        .into_iter()
        .map(|(tag, count)| (tag.to_string(), count))
        .collect();
    top_tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_tags.truncate(5);

    Some(VaultStats {
        notes: notes.len(),
        words,
        oldest: oldest.title.clone(),
        newest: newest.title.clone(),
        top_tags,
    })
}

fn cmd_stats(store: &Store) {
    let Some(stats) = vault_stats(&load_notes(store)) else {
        println!("no notes yet");
        return;
    };
    println!("notes:       {}", stats.notes);
    println!("words:       {}", stats.words);
    println!("oldest note: {}", stats.oldest);
    println!("newest note: {}", stats.newest);
    if !stats.top_tags.is_empty() {
        let tags: Vec<String> = stats
            .top_tags
            .iter()
            .map(|(tag, count)| format!("{} ({})", tag, count))
            .collect();
        println!("top tags:    {}", tags.join(", "));
    }
}

fn run_tui(config: &Config, store: Store) -> io::Result<()> {
    let mut app = App::new(config, store);
    let worker = AiWorker::new(Gateway::new(config));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &worker, &config.editor);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }
    Ok(())
}

fn main() -> io::Result<()> {
    init_logging();
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("-v" | "--version" | "version") => {
            println!("grove {}", VERSION);
            return Ok(());
        }
        Some("-h" | "--help" | "help") => {
            print_help();
            return Ok(());
        }
        Some("-c" | "--config") => {
            println!("{}", Config::config_path().display());
            return Ok(());
        }
        _ => {}
    }

    let config = Config::load().unwrap_or_else(|e| die(e));
    let store = Store::open(config.notes_path()).unwrap_or_else(|e| die(e));
    if let Err(e) = app::welcome_notes::ensure_welcome(&store) {
        warn!("could not create welcome note: {}", e);
    }

    let rest = args.get(2..).unwrap_or_default();
    let joined = rest.join(" ");
    match args.get(1).map(String::as_str) {
        None => return run_tui(&config, store),
        Some("-d" | "--dir") => println!("{}", store.dir().display()),
        Some("new" | "n") => cmd_new(&config, &store, rest),
        Some("today" | "t") => cmd_today(&config, &store),
        Some("add" | "a") => cmd_add(&store, &joined),
        Some("list" | "ls") => cmd_list(&store),
        Some("search" | "s") => cmd_search(&store, &joined),
        Some("ask") => cmd_ask(&config, &store, &joined),
        Some("stats") => cmd_stats(&store),
        Some(arg) if arg.starts_with('-') => {
            eprintln!("Unknown option: {}", arg);
            eprintln!("Run 'grove --help' for usage information");
            process::exit(1);
        }
        Some(arg) => {
            eprintln!("grove: unknown command {:?}", arg);
            eprintln!("Run 'grove --help' for usage information");
            process::exit(1);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    fn note(title: &str, tags: &[&str], body: &str, day: u32) -> Note {
        let created = Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap();
        Note {
            id: title.to_lowercase(),
            title: title.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created,
            updated: created,
            body: body.to_string(),
            raw: String::new(),
            path: PathBuf::from(format!("{}.md", title)),
        }
    }

    #[test]
    fn test_parse_new_args_template_forms() {
        let (t, rest) = parse_new_args(&args(&["--template", "meeting", "Weekly", "sync"])).unwrap();
        assert_eq!(t, "meeting");
        assert_eq!(rest, args(&["Weekly", "sync"]));

        let (t, rest) = parse_new_args(&args(&["Idea", "-t", "brainstorm"])).unwrap();
        assert_eq!(t, "brainstorm");
        assert_eq!(rest, args(&["Idea"]));

        let (t, _) = parse_new_args(&args(&["--template=research", "Paper"])).unwrap();
        assert_eq!(t, "research");
    }

    #[test]
    fn test_parse_new_args_defaults_and_missing_name() {
        let (t, rest) = parse_new_args(&args(&["Plain"])).unwrap();
        assert_eq!(t, "default");
        assert_eq!(rest, args(&["Plain"]));
        assert!(parse_new_args(&args(&["Title", "--template"])).is_err());
    }

    #[test]
    fn test_matching_notes_is_case_insensitive() {
        let notes = vec![
            note("Rust Tips", &["lang"], "borrow checker", 1),
            note("Groceries", &["home"], "milk", 2),
        ];
        let found: Vec<&str> = matching_notes(&notes, "BORROW").iter().map(|n| n.title.as_str()).collect();
        assert_eq!(found, vec!["Rust Tips"]);
        assert_eq!(matching_notes(&notes, "HOME").len(), 1);
        assert!(matching_notes(&notes, "nothing").is_empty());
    }

    #[test]
    fn test_vault_stats() {
        let notes = vec![
            note("Middle", &["work", "ideas"], "one two three", 5),
            note("Oldest", &["work"], "four", 1),
            note("Newest", &["ideas", "work", "misc"], "", 9),
        ];
        let stats = vault_stats(&notes).unwrap();
        assert_eq!(stats.notes, 3);
        assert_eq!(stats.words, 4);
        assert_eq!(stats.oldest, "Oldest");
        assert_eq!(stats.newest, "Newest");
        assert_eq!(
            stats.top_tags,
            vec![("work".to_string(), 3), ("ideas".to_string(), 2), ("misc".to_string(), 1)]
        );
    }

    #[test]
    fn test_vault_stats_empty() {
        assert_eq!(vault_stats(&[]), None);
    }
}
