// src/commands.rs
//! Command handlers for the entitled CLI

use anyhow::Result;
use entitled::{
    Config, ConsumerIdentity, EntitlementDirectory, HttpTransport, OverrideMap, RepoFileGenerator,
    TlsConfig, Transport, discover_releases, fetch_overrides, merge_overrides,
};
use tracing::{info, warn};

/// Regenerate the repository file
pub fn cmd_repos(config: &Config) -> Result<()> {
    if !config.manage_repos()? {
        info!("Repository management is disabled, leaving repository file untouched");
        return Ok(());
    }

    let directory = EntitlementDirectory::new(config.entitlement_dir()?);
    let catalog = directory.load_products()?;

    let overrides = match ConsumerIdentity::load(&config.consumer_dir()?)? {
        Some(identity) => load_overrides(config, &identity),
        None => {
            info!("System is not registered, skipping content overrides");
            OverrideMap::new()
        }
    };

    let generator = RepoFileGenerator::for_directory(
        config.cdn_url()?,
        config.repo_ca_cert()?,
        &directory,
    )
    .with_options(config.repo_file_options()?);

    let repo_file = config.repo_file()?;
    let file = generator.write(&repo_file, &catalog, &overrides)?;
    println!(
        "{} repositories written to {}",
        file.sections().len(),
        repo_file.display()
    );
    Ok(())
}

/// Overrides are advisory: failing to fetch them leaves the defaults in place
fn load_overrides(config: &Config, identity: &ConsumerIdentity) -> OverrideMap {
    let fetched = server_transport(config, identity)
        .and_then(|transport| Ok(fetch_overrides(&transport, &identity.uuid)?));

    match fetched {
        Ok(overrides) => merge_overrides(overrides),
        Err(e) => {
            warn!("Failed to fetch content overrides: {}", e);
            OverrideMap::new()
        }
    }
}

fn server_transport(config: &Config, identity: &ConsumerIdentity) -> Result<HttpTransport> {
    let mut tls = TlsConfig::default()
        .with_ca_dir(&config.ca_cert_dir()?)?
        .with_client_identity(identity.cert_path.clone(), identity.key_path.clone());
    tls.insecure = config.server_insecure()?;
    Ok(HttpTransport::new(&config.server_url()?, &tls)?)
}

/// Print available releases, one per line
pub fn cmd_releases(config: &Config, tags: &[String]) -> Result<()> {
    let directory = EntitlementDirectory::new(config.entitlement_dir()?);
    let catalog = directory.load_products()?;

    let transport = cdn_transport(config, &directory)?;
    let releases = discover_releases(
        transport.as_ref().map(|t| t as &dyn Transport),
        &catalog,
        tags,
    )?;

    for release in releases {
        println!("{release}");
    }
    Ok(())
}

/// Transport authenticated with an entitlement certificate
///
/// `None` without a consumer identity or without any complete entitlement
/// key pair: the CDN is never queried anonymously.
fn cdn_transport(config: &Config, directory: &EntitlementDirectory) -> Result<Option<HttpTransport>> {
    if ConsumerIdentity::load(&config.consumer_dir()?)?.is_none() {
        info!("System is not registered");
        return Ok(None);
    }

    let Some(material) = directory.list_key_material()?.into_iter().next() else {
        info!("No entitlement certificates installed in {}", directory.path().display());
        return Ok(None);
    };

    let tls = TlsConfig {
        ca_certs: vec![config.repo_ca_cert()?],
        ..TlsConfig::default()
    }
    .with_client_identity(material.cert_path, material.key_path);
    Ok(Some(HttpTransport::new(&config.cdn_url()?, &tls)?))
}

/// Print the product catalog
pub fn cmd_products(config: &Config) -> Result<()> {
    let directory = EntitlementDirectory::new(config.entitlement_dir()?);
    let catalog = directory.load_products()?;

    if catalog.is_empty() {
        println!("No entitlements installed");
        return Ok(());
    }

    for (serial, products) in &catalog {
        println!("Entitlement {serial}");
        for product in products {
            println!("  {} {} ({})", product.name, product.version, product.id);
            for content in &product.content {
                println!(
                    "    {:<40} {} {}",
                    content.label,
                    if content.is_enabled() { "enabled " } else { "disabled" },
                    content.path
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    const IDENTITY_PEM: &str = include_str!("../tests/fixtures/identity.pem");
    const IDENTITY_KEY: &str = include_str!("../tests/fixtures/identity-key.pem");

    fn config_for(root: &Path) -> Config {
        Config::parse(&format!(
            "[rhsm]\nconsumer_cert_dir = \"{}\"\nentitlement_cert_dir = \"{}\"\n",
            root.join("consumer").display(),
            root.join("entitlement").display()
        ))
        .unwrap()
    }

    #[test]
    fn test_cdn_transport_requires_identity() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config_for(temp_dir.path());
        let directory = EntitlementDirectory::new(config.entitlement_dir().unwrap());

        assert!(cdn_transport(&config, &directory).unwrap().is_none());
    }

    #[test]
    fn test_cdn_transport_requires_entitlement_key_pair() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config_for(temp_dir.path());
        let consumer = temp_dir.path().join("consumer");
        fs::create_dir_all(&consumer).unwrap();
        fs::write(consumer.join("cert.pem"), IDENTITY_PEM).unwrap();
        fs::write(consumer.join("key.pem"), IDENTITY_KEY).unwrap();

        // Certificate without its key is not usable for the CDN
        let entitlement = temp_dir.path().join("entitlement");
        fs::create_dir_all(&entitlement).unwrap();
        fs::write(entitlement.join("5.pem"), IDENTITY_PEM).unwrap();

        let directory = EntitlementDirectory::new(config.entitlement_dir().unwrap());
        assert!(cdn_transport(&config, &directory).unwrap().is_none());

        let catalog = directory.load_products().unwrap();
        let transport = cdn_transport(&config, &directory).unwrap();
        let result = discover_releases::<&str>(
            transport.as_ref().map(|t| t as &dyn Transport),
            &catalog,
            &[],
        );
        assert!(matches!(result, Err(entitled::Error::NotRegisteredError)));
    }
}
