use tiberius::{AuthMethod, Config as TiberiusConfig, EncryptionLevel};

use crate::config::SybaseOptions;

/// Translate adapter options into a tiberius login configuration.
///
/// The database is selected with an explicit `USE` after login, so it is
/// only passed here as the login default.
#[must_use]
pub fn build_tiberius_config(opts: &SybaseOptions) -> TiberiusConfig {
    let mut config = TiberiusConfig::new();
    config.host(&opts.host);
    config.port(opts.port_or_default());
    config.database(&opts.database);
    config.authentication(AuthMethod::sql_server(&opts.username, &opts.password));
    if let Some(app) = &opts.application_name {
        config.application_name(app);
    }
    config.encryption(EncryptionLevel::NotSupported);
    config.trust_cert();
    config
}
