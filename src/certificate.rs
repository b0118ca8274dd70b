use std::str::FromStr;
use std::time::Duration;

use rsa::pkcs1v15::{Signature, SigningKey};
use rsa::pkcs8::EncodePublicKey;
use rsa::sha2::Sha256;
use rsa::RsaPrivateKey;
use x509_cert::builder::{Builder, CertificateBuilder, Profile};
use x509_cert::der::asn1::{Ia5String, OctetString};
use x509_cert::der::pem::LineEnding;
use x509_cert::der::EncodePem;
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::{
    BasicConstraints, ExtendedKeyUsage, KeyUsage, KeyUsages, SubjectAltName,
};
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use x509_cert::time::Validity;

use const_oid::db::rfc5280::{
    ID_KP_CLIENT_AUTH, ID_KP_CODE_SIGNING, ID_KP_EMAIL_PROTECTION, ID_KP_SERVER_AUTH,
    ID_KP_TIME_STAMPING,
};

use crate::error::FixtureError;

const SUBJECT_DN: &str = "CN=example.org,C=US,ST=Virginia,L=Blacksburg,O=Test,OU=Test";
const SERIAL: u32 = 1;
const VALIDITY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Clone, Debug)]
pub enum AltName {
    Uri(String),
    Ipv4([u8; 4]),
}

/// The extension kinds a fixture certificate can carry. Closed set, one
/// variant per kind, applied in sequence order.
#[derive(Clone, Debug)]
pub enum CertExtension {
    BasicConstraints {
        ca: bool,
    },
    KeyUsage {
        digital_signature: bool,
        non_repudiation: bool,
        key_encipherment: bool,
        data_encipherment: bool,
        key_cert_sign: bool,
    },
    ExtendedKeyUsage {
        server_auth: bool,
        client_auth: bool,
        code_signing: bool,
        email_protection: bool,
        time_stamping: bool,
    },
    SubjectAltName(Vec<AltName>),
}

pub fn default_extensions() -> Vec<CertExtension> {
    vec![
        CertExtension::BasicConstraints { ca: true },
        CertExtension::KeyUsage {
            digital_signature: true,
            non_repudiation: true,
            key_encipherment: true,
            data_encipherment: true,
            key_cert_sign: true,
        },
        CertExtension::ExtendedKeyUsage {
            server_auth: true,
            client_auth: true,
            code_signing: true,
            email_protection: true,
            time_stamping: true,
        },
        CertExtension::SubjectAltName(vec![
            AltName::Uri("http://example.org/webid#me".into()),
            AltName::Ipv4([127, 0, 0, 1]),
        ]),
    ]
}

/// Self-signed certificate over the keypair's public half, PEM encoded.
/// Issuer equals subject; signed with the same PKCS1v1.5/SHA-256 key the
/// fixtures use.
pub fn self_signed(
    private_key: &RsaPrivateKey,
    extensions: &[CertExtension],
) -> Result<String, FixtureError> {
    let signer = SigningKey::<Sha256>::new(private_key.clone());

    let spki_der = private_key
        .to_public_key()
        .to_public_key_der()
        .map_err(|e| FixtureError::PemEncode(e.to_string()))?;
    let spki = SubjectPublicKeyInfoOwned::try_from(spki_der.as_bytes())
        .map_err(|e| FixtureError::CertificateBuild(e.to_string()))?;

    let subject = Name::from_str(SUBJECT_DN)
        .map_err(|e| FixtureError::CertificateBuild(e.to_string()))?;
    let validity =
        Validity::from_now(VALIDITY).map_err(|e| FixtureError::CertificateBuild(e.to_string()))?;

    let mut builder = CertificateBuilder::new(
        Profile::Manual { issuer: None },
        SerialNumber::from(SERIAL),
        validity,
        subject,
        spki,
        &signer,
    )
    .map_err(|e| FixtureError::CertificateBuild(e.to_string()))?;

    for ext in extensions {
        match ext {
            CertExtension::BasicConstraints { ca } => builder.add_extension(&BasicConstraints {
                ca: *ca,
                path_len_constraint: None,
            }),
            CertExtension::KeyUsage {
                digital_signature,
                non_repudiation,
                key_encipherment,
                data_encipherment,
                key_cert_sign,
            } => {
                let mut selected = Vec::new();
                for (on, flag) in [
                    (*digital_signature, KeyUsages::DigitalSignature),
                    (*non_repudiation, KeyUsages::NonRepudiation),
                    (*key_encipherment, KeyUsages::KeyEncipherment),
                    (*data_encipherment, KeyUsages::DataEncipherment),
                    (*key_cert_sign, KeyUsages::KeyCertSign),
                ] {
                    if on {
                        selected.push(flag);
                    }
                }
                let mut flags = selected.into_iter();
                let first = flags.next().ok_or_else(|| {
                    FixtureError::CertificateBuild("key usage with no bits set".into())
                })?;
                builder.add_extension(&KeyUsage(flags.fold(first.into(), |acc, flag| acc | flag)))
            }
            CertExtension::ExtendedKeyUsage {
                server_auth,
                client_auth,
                code_signing,
                email_protection,
                time_stamping,
            } => {
                let mut oids = Vec::new();
                for (on, oid) in [
                    (*server_auth, ID_KP_SERVER_AUTH),
                    (*client_auth, ID_KP_CLIENT_AUTH),
                    (*code_signing, ID_KP_CODE_SIGNING),
                    (*email_protection, ID_KP_EMAIL_PROTECTION),
                    (*time_stamping, ID_KP_TIME_STAMPING),
                ] {
                    if on {
                        oids.push(oid);
                    }
                }
                builder.add_extension(&ExtendedKeyUsage(oids))
            }
            CertExtension::SubjectAltName(names) => {
                let general = names
                    .iter()
                    .map(|name| match name {
                        AltName::Uri(uri) => {
                            Ia5String::new(uri).map(GeneralName::UniformResourceIdentifier)
                        }
                        AltName::Ipv4(ip) => {
                            OctetString::new(ip.to_vec()).map(GeneralName::IpAddress)
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| FixtureError::CertificateBuild(e.to_string()))?;
                builder.add_extension(&SubjectAltName(general))
            }
        }
        .map_err(|e| FixtureError::CertificateBuild(e.to_string()))?;
    }

    let cert = builder
        .build::<Signature>()
        .map_err(|e| FixtureError::CertificateBuild(e.to_string()))?;

    cert.to_pem(LineEnding::LF)
        .map_err(|e| FixtureError::PemEncode(e.to_string()))
}

#[test]
fn test_self_signed_certificate_shape() {
    use rsa::signature::Verifier;
    use x509_parser::pem::parse_x509_pem;
    use x509_parser::prelude::*;

    let mut rng = rand_core::OsRng;
    let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("failed to generate a key");
    let pem = self_signed(&private_key, &default_extensions()).unwrap();

    let (_, pem) = parse_x509_pem(pem.as_bytes()).unwrap();
    assert_eq!(pem.label, "CERTIFICATE");
    let (_, cert) = parse_x509_certificate(&pem.contents).unwrap();

    assert_eq!(cert.subject().to_string(), cert.issuer().to_string());
    assert!(cert.validity().is_valid());
    assert_eq!(cert.raw_serial(), &[1]);

    let bc = cert.basic_constraints().unwrap().unwrap();
    assert!(bc.value.ca);

    let eku = cert.extended_key_usage().unwrap().unwrap();
    assert!(eku.value.server_auth);
    assert!(eku.value.time_stamping);

    let san = cert.subject_alternative_name().unwrap().unwrap();
    assert!(san.value.general_names.iter().any(|name| match name {
        x509_parser::extensions::GeneralName::URI(uri) => *uri == "http://example.org/webid#me",
        _ => false,
    }));

    // the certificate signature must check out against its own key
    let verifying_key =
        rsa::pkcs1v15::VerifyingKey::<Sha256>::new(private_key.to_public_key());
    let signature = Signature::try_from(cert.signature_value.data.as_ref()).unwrap();
    verifying_key
        .verify(cert.tbs_certificate.as_ref(), &signature)
        .unwrap();
}
