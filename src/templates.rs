//! Starting bodies for new notes. `{{title}}` and `{{date}}` are filled in
//! when the note is created.

pub const NAMES: [&str; 4] = ["default", "meeting", "brainstorm", "research"];

const MEETING: &str = "## {{title}}

**Date:** {{date}}
**Attendees:**

## Agenda

-

## Notes

## Action Items

- [ ]
";

const BRAINSTORM: &str = "## {{title}}

**Date:** {{date}}

## Core idea

## Branches

-
-
-

## Keep / discard

| Idea | Keep? |
|------|-------|
|      |       |
";

const RESEARCH: &str = "## {{title}}

**Date:** {{date}}

## Question

## Sources

-

## Notes

## Conclusion
";

fn body(name: &str) -> &'static str {
    match name {
        "meeting" => MEETING,
        "brainstorm" => BRAINSTORM,
        "research" => RESEARCH,
        _ => "",
    }
}

/// Unknown names render like `default`, which is empty.
pub fn render(name: &str, title: &str, date: &str) -> String {
    body(name).replace("{{title}}", title).replace("{{date}}", date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_placeholders() {
        let body = render("meeting", "Sprint Planning", "2024-01-15");
        assert!(body.contains("## Sprint Planning"));
        assert!(body.contains("**Date:** 2024-01-15"));
        assert!(!body.contains("{{"));
    }

    #[test]
    fn test_default_and_unknown_are_empty() {
        assert_eq!(render("default", "Title", "2024-01-15"), "");
        assert_eq!(render("nonexistent", "Title", "2024-01-15"), "");
    }

    #[test]
    fn test_templates_have_their_sections() {
        let cases = [
            ("meeting", ["## Agenda", "## Notes", "## Action Items"]),
            ("brainstorm", ["## Core idea", "## Branches", "## Keep / discard"]),
            ("research", ["## Question", "## Sources", "## Conclusion"]),
        ];
        for (name, sections) in cases {
            let body = render(name, "T", "2024-01-15");
            for section in sections {
                assert!(body.contains(section), "{} missing {}", name, section);
            }
        }
    }

    #[test]
    fn test_every_name_renders() {
        assert_eq!(NAMES[0], "default");
        for name in &NAMES[1..] {
            assert!(!render(name, "T", "D").is_empty());
        }
    }
}
