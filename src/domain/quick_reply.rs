// src/domain/quick_reply.rs

use crate::domain::entities::QuickReply;

pub fn validate_quick_reply(r: &QuickReply) -> Result<(), &'static str> {
    if r.title.trim().is_empty() {
        return Err("titulo is required");
    }
    if r.content.trim().is_empty() {
        return Err("conteudo is required");
    }
    Ok(())
}

/// Find the active reply whose shortcut the draft starts with.
///
/// `"/horario"` and `"/horario amanhã?"` both match a reply with shortcut
/// `/horario`; `"/horarios"` does not.
pub fn find_by_shortcut<'a>(replies: &'a [QuickReply], draft: &str) -> Option<&'a QuickReply> {
    let first = draft.trim_start().split_whitespace().next()?;
    replies.iter().find(|r| {
        r.active
            && r.shortcut
                .as_deref()
                .map(str::trim)
                .is_some_and(|s| !s.is_empty() && s.eq_ignore_ascii_case(first))
    })
}
