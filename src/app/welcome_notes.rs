use tracing::info;

use crate::error::Result;
use crate::notes::{Note, Store};

pub const WELCOME_TITLE: &str = "Welcome to grove";

pub const WELCOME_CONTENT: &str = r#"## Welcome to grove

Your knowledge garden in the terminal. Notes are plain markdown files, yours forever.

### Quick start

| Key | Action |
|-----|--------|
| **n** | new note |
| **N** | new note with template |
| **t** | today's daily note |
| **/** | fuzzy search |
| **e** | edit in $EDITOR |
| **A** | ask AI about this note |
| **@** | vault-wide AI |
| **L** | links panel |
| **?** | full help |

### From the command line

```sh
grove today                      # open today's daily note
grove add "idea"                 # append a quick thought to today's note
grove new "title"                # create and open a note
grove new --template meeting "Title"  # use a template
grove list                       # list all notes
grove ask "what did I write about auth?"  # AI search across vault
grove stats                      # show vault statistics
```

### Tips

- Use **daily notes** (`t`) as your inbox. Dump everything there, clean up later.
- Use **tags** in frontmatter: `tags: [work, ideas]`. They are searchable from `/`.
- **AI** (`A`) uses your Gemini key: `ai_key` in the grove config, the pairy config or `GEMINI_API_KEY`.
- Link notes with `[[Welcome to grove]]` style wiki-links and browse them with `L`.

Happy gardening.
"#;

/// Seed an empty vault with the welcome note. Returns the note if one was
/// created.
pub fn ensure_welcome(store: &Store) -> Result<Option<Note>> {
    if !store.load_all()?.is_empty() {
        return Ok(None);
    }

    let mut note = store.create(WELCOME_TITLE, &["grove".to_string()])?;
    note.body = WELCOME_CONTENT.to_string();
    store.save(&mut note)?;
    info!("seeded empty vault with {}", note.id);
    Ok(Some(note))
}
