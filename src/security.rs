//! Local signing identity.
//!
//! A [`KeyChain`] holds one in-memory identity with an Ed25519 key. Keys are
//! generated at startup and never persisted, so consumers have to fetch the
//! public key from the running process (see [`KeyChain::public_key`]).

use ed25519_dalek::{Signature as Ed25519Signature, Signer, SigningKey, Verifier, VerifyingKey};
use thiserror::Error;

use crate::name::Name;
use crate::packet::{Data, Signature};

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("identity name must not be empty")]
    EmptyIdentity,
    #[error("failed to encode signed portion: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("data is not signed")]
    Unsigned,
    #[error("signed by {0}, not by this key")]
    WrongKey(Name),
    #[error("malformed signature value")]
    MalformedSignature,
    #[error("signature verification failed")]
    VerificationFailed,
}

pub struct KeyChain {
    identity: Name,
    certificate_name: Name,
    signing_key: SigningKey,
}

impl KeyChain {
    /// Create an identity and a default certificate for it.
    pub fn build(identity: Name) -> Result<Self, SecurityError> {
        if identity.is_empty() {
            return Err(SecurityError::EmptyIdentity);
        }
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        let key_id = hex::encode(&signing_key.verifying_key().as_bytes()[..8]);
        let certificate_name = identity.append("KEY").append(key_id);
        Ok(Self {
            identity,
            certificate_name,
            signing_key,
        })
    }

    pub fn identity(&self) -> &Name {
        &self.identity
    }

    pub fn default_certificate_name(&self) -> &Name {
        &self.certificate_name
    }

    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Sign `data` with the default certificate, replacing any prior signature.
    pub fn sign(&self, data: &mut Data) -> Result<(), SecurityError> {
        let portion = data.signed_portion(&self.certificate_name)?;
        let sig = self.signing_key.sign(&portion);
        data.signature = Some(Signature {
            key_locator: self.certificate_name.clone(),
            value: hex::encode(sig.to_bytes()),
        });
        Ok(())
    }

    pub fn verify(&self, data: &Data) -> Result<(), SecurityError> {
        let sig = data.signature.as_ref().ok_or(SecurityError::Unsigned)?;
        if sig.key_locator != self.certificate_name {
            return Err(SecurityError::WrongKey(sig.key_locator.clone()));
        }
        verify_data(data, &self.public_key())
    }
}

/// Check `data` against a known public key, whatever its key locator says.
pub fn verify_data(data: &Data, key: &VerifyingKey) -> Result<(), SecurityError> {
    let sig = data.signature.as_ref().ok_or(SecurityError::Unsigned)?;
    let bytes: [u8; 64] = hex::decode(&sig.value)
        .ok()
        .and_then(|b| b.try_into().ok())
        .ok_or(SecurityError::MalformedSignature)?;
    let portion = data.signed_portion(&sig.key_locator)?;
    key.verify(&portion, &Ed25519Signature::from_bytes(&bytes))
        .map_err(|_| SecurityError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn keychain() -> KeyChain {
        KeyChain::build(Name::from_uri("/thisRoom/identity")).unwrap()
    }

    fn sample() -> Data {
        let mut data = Data::new(Name::from_uri("/thisRoom/pi/42/led/1/value/on"), "LED #1 is now on");
        data.freshness_period = Duration::from_secs(4);
        data
    }

    #[test]
    fn rejects_empty_identity() {
        assert!(matches!(
            KeyChain::build(Name::default()),
            Err(SecurityError::EmptyIdentity)
        ));
    }

    #[test]
    fn certificate_name_is_under_identity() {
        let kc = keychain();
        let cert = kc.default_certificate_name();
        assert!(kc.identity().is_prefix_of(cert));
        assert_eq!(cert.components()[2], "KEY");
        assert_eq!(cert.components()[3].len(), 16);
    }

    #[test]
    fn sign_then_verify() {
        let kc = keychain();
        let mut data = sample();
        kc.sign(&mut data).unwrap();
        let sig = data.signature.as_ref().unwrap();
        assert_eq!(&sig.key_locator, kc.default_certificate_name());
        assert!(kc.verify(&data).is_ok());
    }

    #[test]
    fn tampering_breaks_the_signature() {
        let kc = keychain();
        let mut data = sample();
        kc.sign(&mut data).unwrap();

        let mut tampered = data.clone();
        tampered.content = "LED #1 is now off".into();
        assert!(matches!(kc.verify(&tampered), Err(SecurityError::VerificationFailed)));

        let mut stale = data.clone();
        stale.freshness_period = Duration::from_secs(3600);
        assert!(matches!(kc.verify(&stale), Err(SecurityError::VerificationFailed)));
    }

    #[test]
    fn other_identity_does_not_verify() {
        let mut data = sample();
        keychain().sign(&mut data).unwrap();
        let other = keychain();
        assert!(matches!(other.verify(&data), Err(SecurityError::WrongKey(_))));
        assert!(matches!(
            verify_data(&data, &other.public_key()),
            Err(SecurityError::VerificationFailed)
        ));
    }

    #[test]
    fn unsigned_and_malformed() {
        let kc = keychain();
        let mut data = sample();
        assert!(matches!(kc.verify(&data), Err(SecurityError::Unsigned)));

        data.signature = Some(Signature {
            key_locator: kc.default_certificate_name().clone(),
            value: "zz".into(),
        });
        assert!(matches!(kc.verify(&data), Err(SecurityError::MalformedSignature)));
    }
}
