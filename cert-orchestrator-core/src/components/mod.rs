//! Components built on the engine

pub mod dns_validated_certificate;

pub use dns_validated_certificate::{
    CERTIFICATE_COMPONENT_TYPE, CertificateValidation, DnsValidatedCertificate,
    DnsValidatedCertificateArgs,
};
