//! Configuración de variables de entorno
//!
//! Todas las variables tienen un valor por defecto razonable salvo las de
//! base de datos, que viven en `config::database`.

use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_VIN_MAX_ATTEMPTS: u32 = 5;

/// Errores al leer la configuración
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    /// Fracción del precio que se lleva el vendedor (0.15 = 15 %)
    pub commission_rate: Decimal,
    /// Reintentos de generación de VIN ante colisión
    pub vin_max_attempts: u32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: DEFAULT_PORT,
            host: DEFAULT_HOST.to_string(),
            cors_origins: Vec::new(),
            commission_rate: Decimal::new(15, 2),
            vin_max_attempts: DEFAULT_VIN_MAX_ATTEMPTS,
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

/// Lista separada por comas, sin entradas vacías
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl EnvironmentConfig {
    /// Lee la configuración de las variables de entorno del proceso
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Lee la configuración con una función de búsqueda arbitraria
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let commission_raw = lookup("COMMISSION_RATE");
        let commission_rate = parse_var(
            "COMMISSION_RATE",
            commission_raw.clone(),
            defaults.commission_rate,
        )?;
        if commission_rate < Decimal::ZERO || commission_rate > Decimal::ONE {
            return Err(ConfigError::Invalid {
                name: "COMMISSION_RATE",
                value: commission_raw.unwrap_or_default(),
            });
        }

        let vin_max_attempts = parse_var("VIN_MAX_ATTEMPTS", lookup("VIN_MAX_ATTEMPTS"), defaults.vin_max_attempts)?;
        if vin_max_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "VIN_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            port: parse_var("PORT", lookup("PORT"), defaults.port)?,
            host: lookup("HOST").unwrap_or(defaults.host),
            cors_origins: lookup("CORS_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
            commission_rate,
            vin_max_attempts,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección de escucha del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = EnvironmentConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.commission_rate.to_string(), "0.15");
        assert_eq!(config.vin_max_attempts, 5);
        assert!(config.cors_origins.is_empty());
        assert!(config.is_development());
    }

    #[test]
    fn test_reads_values() {
        let config = EnvironmentConfig::from_lookup(lookup_from(&[
            ("ENVIRONMENT", "production"),
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("CORS_ORIGINS", "http://a.test, ,http://b.test"),
            ("COMMISSION_RATE", "0.20"),
        ]))
        .unwrap();

        assert!(config.is_production());
        assert_eq!(config.server_url(), "127.0.0.1:8080");
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.commission_rate, Decimal::new(20, 2));
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = EnvironmentConfig::from_lookup(lookup_from(&[("PORT", "abc")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "PORT",
                value: "abc".to_string()
            }
        );

        assert!(EnvironmentConfig::from_lookup(lookup_from(&[("COMMISSION_RATE", "1.5")])).is_err());
        assert!(EnvironmentConfig::from_lookup(lookup_from(&[("VIN_MAX_ATTEMPTS", "0")])).is_err());
    }
}
