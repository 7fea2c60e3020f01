use crate::core::FormField;
use crate::utils::error::{FormError, Result};

/// 一行輸入對應一個 UI 事件
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    Change { field: FormField, value: String },
    Submit,
    Show,
    Quit,
}

pub fn parse_command(line: &str) -> Result<FormEvent> {
    let trimmed = line.trim();
    match trimmed {
        "submit" => return Ok(FormEvent::Submit),
        "show" => return Ok(FormEvent::Show),
        "quit" | "exit" => return Ok(FormEvent::Quit),
        _ => {}
    }

    let Some((field, value)) = line.split_once('=') else {
        return Err(FormError::Command {
            input: trimmed.to_string(),
            reason: "expected <field>=<value>".to_string(),
        });
    };

    let field = field.trim();
    let field = field.parse::<FormField>().map_err(|_| FormError::Command {
        input: trimmed.to_string(),
        reason: format!("unknown field '{}'", field),
    })?;

    Ok(FormEvent::Change {
        field,
        value: value.to_string(),
    })
}
