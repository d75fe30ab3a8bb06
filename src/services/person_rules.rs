//! Reglas de normalización y validación de personas
//!
//! Vendedores y clientes comparten la capitalización de nombres y las
//! reglas de formato de email y teléfono.

use uuid::Uuid;

use crate::models::customer::{Customer, CustomerDraft};
use crate::models::salesperson::{Salesperson, SalespersonDraft};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::{validate_email, validate_not_empty, validate_phone};

/// Primera letra en mayúscula y el resto en minúscula
pub fn capitalize_word(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Capitaliza cada palabra de un nombre: `john mcdonald` -> `John McDonald`
///
/// Los guiones y apóstrofes también abren palabra (`o'brien` -> `O'Brien`).
pub fn normalize_name(value: &str) -> String {
    value
        .split_whitespace()
        .map(normalize_name_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_name_word(word: &str) -> String {
    let mut normalized = String::with_capacity(word.len());
    let mut segment = String::new();

    for ch in word.chars() {
        if ch == '-' || ch == '\'' {
            normalized.push_str(&capitalize_name_segment(&segment));
            segment.clear();
            normalized.push(ch);
        } else {
            segment.push(ch);
        }
    }
    normalized.push_str(&capitalize_name_segment(&segment));
    normalized
}

fn capitalize_name_segment(segment: &str) -> String {
    let lower = segment.to_lowercase();
    match lower.strip_prefix("mc") {
        Some(rest) if !rest.is_empty() => format!("Mc{}", capitalize_word(rest)),
        _ => capitalize_word(&lower),
    }
}

fn require_name(value: &str, field: &str) -> AppResult<()> {
    validate_not_empty(value).map_err(|_| AppError::InvalidFormat(format!("{} is required", field)))
}

fn require_email_format(email: &str) -> AppResult<()> {
    validate_email(email).map_err(|_| AppError::InvalidFormat("Invalid email format".to_string()))
}

fn require_phone_format(phone: &str) -> AppResult<()> {
    validate_phone(phone).map_err(|_| {
        AppError::InvalidFormat("Invalid phone number format. Please use 999999999 format".to_string())
    })
}

/// Normaliza nombres y recorta email/teléfono
pub fn normalize_salesperson(draft: SalespersonDraft) -> SalespersonDraft {
    SalespersonDraft {
        first_name: normalize_name(&draft.first_name),
        last_name: normalize_name(&draft.last_name),
        email: draft.email.trim().to_string(),
        phone_number: draft.phone_number.trim().to_string(),
    }
}

/// Nombres presentes, email y teléfono con formato válido
///
/// No consulta la base de datos; los controladores la llaman antes de abrir
/// la transacción.
pub fn check_salesperson_format(draft: &SalespersonDraft) -> AppResult<()> {
    require_name(&draft.first_name, "First name")?;
    require_name(&draft.last_name, "Last name")?;
    require_email_format(&draft.email)?;
    require_phone_format(&draft.phone_number)
}

/// Valida formato y unicidad de un vendedor contra los registros existentes
///
/// `exclude_id` es el propio vendedor cuando se trata de una actualización.
pub fn validate_salesperson(
    draft: &SalespersonDraft,
    existing: &[Salesperson],
    exclude_id: Option<Uuid>,
) -> AppResult<()> {
    check_salesperson_format(draft)?;

    let others: Vec<&Salesperson> = existing
        .iter()
        .filter(|other| Some(other.id) != exclude_id)
        .collect();

    if others.iter().any(|other| {
        other.first_name.to_lowercase() == draft.first_name.to_lowercase()
            && other.last_name.to_lowercase() == draft.last_name.to_lowercase()
    }) {
        return Err(AppError::DuplicateRecord("Salesperson already exists".to_string()));
    }

    if others
        .iter()
        .any(|other| other.email.to_lowercase() == draft.email.to_lowercase())
    {
        return Err(AppError::DuplicateRecord("Email already exists".to_string()));
    }

    if others
        .iter()
        .any(|other| other.phone_number.to_lowercase() == draft.phone_number.to_lowercase())
    {
        return Err(AppError::DuplicateRecord("Phone number already exists".to_string()));
    }

    Ok(())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normaliza nombres de cliente y limpia campos opcionales vacíos
pub fn normalize_customer(draft: CustomerDraft) -> CustomerDraft {
    let mut purchased = draft.purchased_vehicle_ids;
    purchased.sort();
    purchased.dedup();

    CustomerDraft {
        first_name: normalize_name(&draft.first_name),
        last_name: normalize_name(&draft.last_name),
        email: draft.email.trim().to_string(),
        phone_number: trimmed(draft.phone_number),
        address: trimmed(draft.address),
        city: trimmed(draft.city),
        state: trimmed(draft.state),
        zip_code: trimmed(draft.zip_code),
        handled_by: draft.handled_by,
        purchased_vehicle_ids: purchased,
    }
}

/// Igual que `check_salesperson_format`, con teléfono opcional
pub fn check_customer_format(draft: &CustomerDraft) -> AppResult<()> {
    require_name(&draft.first_name, "First name")?;
    require_name(&draft.last_name, "Last name")?;
    require_email_format(&draft.email)?;
    match &draft.phone_number {
        Some(phone) => require_phone_format(phone),
        None => Ok(()),
    }
}

/// Valida formato y unicidad del email de un cliente
pub fn validate_customer(
    draft: &CustomerDraft,
    existing: &[Customer],
    exclude_id: Option<Uuid>,
) -> AppResult<()> {
    check_customer_format(draft)?;

    let email = draft.email.to_lowercase();
    if existing
        .iter()
        .filter(|other| Some(other.id) != exclude_id)
        .any(|other| other.email.to_lowercase() == email)
    {
        return Err(AppError::DuplicateRecord("Customer email already exists".to_string()));
    }

    Ok(())
}
