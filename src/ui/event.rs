//! 控制台命令解析
//!
//! 每行输入解析为一个 ConsoleCommand；无法识别的输入交给 app 输出帮助。

/// 编辑快照中可修改的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceField {
    Url,
    Title,
    Description,
}

/// 控制台命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Help,
    Show,
    Question(String),
    Report(String),
    /// add <url> | <title> | <description>
    Add {
        url: String,
        title: String,
        description: String,
    },
    Remove(String),
    Edit(String),
    Set(ResourceField, String),
    Save,
    Cancel,
    Documents,
    /// 目录序号或文档 id
    Select(String),
    ExportPdf,
    ExportCodelabs,
    Review,
    Approve,
    Decline,
    Quit,
    Unknown(String),
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((h, r)) => (h, r.trim()),
            None => (line, ""),
        };
        let cmd = match head.to_lowercase().as_str() {
            "help" | "?" => Self::Help,
            "show" | "state" => Self::Show,
            "question" | "q" => Self::Question(rest.to_string()),
            "report" => Self::Report(rest.to_string()),
            "add" => {
                let mut parts = rest.splitn(3, '|').map(|p| p.trim().to_string());
                Self::Add {
                    url: parts.next().unwrap_or_default(),
                    title: parts.next().unwrap_or_default(),
                    description: parts.next().unwrap_or_default(),
                }
            }
            "remove" | "rm" => Self::Remove(rest.to_string()),
            "edit" => Self::Edit(rest.to_string()),
            "set" => {
                let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                match field.to_lowercase().as_str() {
                    "url" => Self::Set(ResourceField::Url, value.trim().to_string()),
                    "title" => Self::Set(ResourceField::Title, value.trim().to_string()),
                    "description" | "desc" => Self::Set(ResourceField::Description, value.trim().to_string()),
                    _ => Self::Unknown(line.to_string()),
                }
            }
            "save" => Self::Save,
            "cancel" => Self::Cancel,
            "docs" | "documents" => Self::Documents,
            "select" => Self::Select(rest.to_string()),
            "pdf" => Self::ExportPdf,
            "codelabs" => Self::ExportCodelabs,
            "review" => Self::Review,
            "yes" | "delete" | "approve" => Self::Approve,
            "no" | "decline" => Self::Decline,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        };
        Some(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_with_pipes() {
        assert_eq!(
            ConsoleCommand::parse("add http://x | X | a paper"),
            Some(ConsoleCommand::Add {
                url: "http://x".into(),
                title: "X".into(),
                description: "a paper".into()
            })
        );
        assert_eq!(
            ConsoleCommand::parse("add"),
            Some(ConsoleCommand::Add {
                url: String::new(),
                title: String::new(),
                description: String::new()
            })
        );
    }

    #[test]
    fn test_parse_set_and_decisions() {
        assert_eq!(
            ConsoleCommand::parse("set url http://a2"),
            Some(ConsoleCommand::Set(ResourceField::Url, "http://a2".into()))
        );
        assert_eq!(ConsoleCommand::parse("YES"), Some(ConsoleCommand::Approve));
        assert_eq!(ConsoleCommand::parse("no"), Some(ConsoleCommand::Decline));
        assert_eq!(ConsoleCommand::parse("   "), None);
        assert!(matches!(ConsoleCommand::parse("set colour red"), Some(ConsoleCommand::Unknown(_))));
    }

    #[test]
    fn test_question_keeps_full_text() {
        assert_eq!(
            ConsoleCommand::parse("question  Why is the sky blue?"),
            Some(ConsoleCommand::Question("Why is the sky blue?".into()))
        );
    }
}
