//! Request signing service
//!
//! Two signing shapes, matching the two tamper-protection requirements:
//! a signed URL query string for the redirect binding, and an enveloped
//! signature block for documents carried in a POST body.

use crate::error::{SignOnError, SignOnResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use flate2::{write::DeflateEncoder, Compression};
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::sign::Signer;
use std::io::Write;

/// RSA-SHA256 signature algorithm URN
pub const SIG_ALG_RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";

/// Signing operations performed on outgoing requests.
///
/// Full XML-DSig canonicalization belongs to external signers; the default
/// implementation signs the byte-stable XML this crate itself produces.
pub trait SigningService: Send + Sync {
    /// Embed an enveloped signature into the document (POST binding).
    fn sign_document(&self, xml: &str) -> SignOnResult<String>;

    /// Produce a URL-encoded, signed query string for the redirect binding:
    /// `SAMLRequest=..[&RelayState=..]&SigAlg=..&Signature=..`
    fn signed_query_string(&self, xml: &str, relay_state: Option<&str>) -> SignOnResult<String>;
}

/// RSA-SHA256 signer backed by openssl.
pub struct OpensslSigner {
    key: PKey<Private>,
}

impl OpensslSigner {
    /// Build a signer from a PEM-encoded private key.
    pub fn from_pem(private_key_pem: &str) -> SignOnResult<Self> {
        let key = PKey::private_key_from_pem(private_key_pem.as_bytes())
            .map_err(|e| SignOnError::Signing(format!("Invalid private key: {e}")))?;
        Ok(Self { key })
    }

    fn sign_bytes(&self, data: &[u8]) -> SignOnResult<Vec<u8>> {
        let mut signer = Signer::new(MessageDigest::sha256(), &self.key)
            .map_err(|e| SignOnError::Signing(format!("Signer creation failed: {e}")))?;
        signer
            .update(data)
            .map_err(|e| SignOnError::Signing(format!("Signer update failed: {e}")))?;
        signer
            .sign_to_vec()
            .map_err(|e| SignOnError::Signing(format!("Signing failed: {e}")))
    }
}

impl SigningService for OpensslSigner {
    fn sign_document(&self, xml: &str) -> SignOnResult<String> {
        let digest = openssl::hash::hash(MessageDigest::sha256(), xml.as_bytes())
            .map_err(|e| SignOnError::Signing(format!("Digest failed: {e}")))?;
        let digest_value = STANDARD.encode(&digest);

        let signed_info = format!(
            concat!(
                "<ds:SignedInfo xmlns:ds=\"http://www.w3.org/2000/09/xmldsig#\">",
                "<ds:CanonicalizationMethod Algorithm=\"http://www.w3.org/2001/10/xml-exc-c14n#\"/>",
                "<ds:SignatureMethod Algorithm=\"{}\"/>",
                "<ds:Reference URI=\"\">",
                "<ds:Transforms>",
                "<ds:Transform Algorithm=\"http://www.w3.org/2000/09/xmldsig#enveloped-signature\"/>",
                "</ds:Transforms>",
                "<ds:DigestMethod Algorithm=\"http://www.w3.org/2001/04/xmlenc#sha256\"/>",
                "<ds:DigestValue>{}</ds:DigestValue>",
                "</ds:Reference>",
                "</ds:SignedInfo>"
            ),
            SIG_ALG_RSA_SHA256, digest_value
        );

        let signature_value = STANDARD.encode(self.sign_bytes(signed_info.as_bytes())?);

        let signature_block = format!(
            concat!(
                "<ds:Signature xmlns:ds=\"http://www.w3.org/2000/09/xmldsig#\">",
                "{}",
                "<ds:SignatureValue>{}</ds:SignatureValue>",
                "</ds:Signature>"
            ),
            signed_info, signature_value
        );

        // Enveloped signature: inserted before the root element's close tag.
        let insert_at = xml.rfind("</").ok_or_else(|| {
            SignOnError::Signing("Document has no closing tag to envelope".to_string())
        })?;
        let mut signed = String::with_capacity(xml.len() + signature_block.len());
        signed.push_str(&xml[..insert_at]);
        signed.push_str(&signature_block);
        signed.push_str(&xml[insert_at..]);

        Ok(signed)
    }

    fn signed_query_string(&self, xml: &str, relay_state: Option<&str>) -> SignOnResult<String> {
        // DEFLATE, then base64, then URL-encode.
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(xml.as_bytes())
            .map_err(|e| SignOnError::Signing(format!("Compression failed: {e}")))?;
        let compressed = encoder
            .finish()
            .map_err(|e| SignOnError::Signing(format!("Compression finish failed: {e}")))?;
        let encoded = STANDARD.encode(&compressed);

        // The signature covers SAMLRequest, RelayState (when present) and
        // SigAlg, in that order, over the URL-encoded values.
        let mut query = format!("SAMLRequest={}", urlencoding::encode(&encoded));
        if let Some(rs) = relay_state {
            if !rs.is_empty() {
                query.push_str("&RelayState=");
                query.push_str(&urlencoding::encode(rs));
            }
        }
        query.push_str("&SigAlg=");
        query.push_str(&urlencoding::encode(SIG_ALG_RSA_SHA256));

        let signature = STANDARD.encode(self.sign_bytes(query.as_bytes())?);
        query.push_str("&Signature=");
        query.push_str(&urlencoding::encode(&signature));

        Ok(query)
    }
}
