// src/domain/patient.rs

use crate::domain::entities::Patient;

pub fn validate_patient(p: &Patient) -> Result<(), &'static str> {
    if p.full_name.trim().is_empty() {
        return Err("nome_completo is required");
    }
    if p.phone.trim().is_empty() {
        return Err("telefone is required");
    }
    Ok(())
}

/// Registry search: name or email (case-insensitive) or phone substring.
pub fn matches_search(p: &Patient, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    let lower = term.to_lowercase();
    p.full_name.to_lowercase().contains(&lower)
        || p.phone.contains(term)
        || p
            .email
            .as_deref()
            .is_some_and(|e| e.to_lowercase().contains(&lower))
}
