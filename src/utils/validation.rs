//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de formatos
//! (email, teléfono, VIN) y rangos numéricos.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use validator::ValidationError;

lazy_static! {
    /// Formato aceptado para teléfonos: prefijo opcional `+1` y de 9 a 15 dígitos
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?1?\d{9,15}$").unwrap();

    /// VIN simplificado: 17 caracteres en mayúsculas o dígitos
    static ref VIN_REGEX: Regex = Regex::new(r"^[A-Z0-9]{17}$").unwrap();
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de email
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if !validator::validate_email(value) {
        let mut error = ValidationError::new("email");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de teléfono
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if !PHONE_REGEX.is_match(value) {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"999999999".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de VIN
pub fn validate_vin(value: &str) -> Result<(), ValidationError> {
    if !VIN_REGEX.is_match(value) {
        let mut error = ValidationError::new("vin");
        error.add_param("value".into(), &value.to_string());
        error.add_param("length".into(), &17);
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Precio y kilometraje: `#[validate(custom = ...)]` recibe el valor copiado
pub fn validate_amount(value: i64) -> Result<(), ValidationError> {
    validate_non_negative(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_empty() {
        assert!(validate_not_empty("Ford").is_ok());
        assert!(validate_not_empty("   ").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("invalid-email").is_err());
        assert!(validate_email("test@").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("1234567890").is_ok());
        assert!(validate_phone("+11234567890").is_ok());
        assert!(validate_phone("123456789").is_ok());
        assert!(validate_phone("12345678").is_err());
        assert!(validate_phone("123-456-7890").is_err());
        assert!(validate_phone("1234567890123456789").is_err());
    }

    #[test]
    fn test_validate_vin() {
        assert!(validate_vin("1HGCM82633A004352").is_ok());
        assert!(validate_vin("1hgcm82633a004352").is_err());
        assert!(validate_vin("1HGCM82633A00435").is_err());
        assert!(validate_vin("1HGCM82633A00435-").is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative(0i64).is_ok());
        assert!(validate_non_negative(15000i64).is_ok());
        assert!(validate_non_negative(-1i64).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(0).is_ok());
        assert!(validate_amount(49_999).is_ok());

        let error = validate_amount(-10).unwrap_err();
        assert_eq!(error.code, "non_negative");
    }
}
