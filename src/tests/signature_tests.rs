//! tests/signature_tests.rs

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::services::signature::{sign_payload, SignatureVerifier};

    #[test]
    fn signs_compact_json_with_hmac_sha256() {
        let payload = json!({ "postJobId": "1", "channel": "instagram" });

        // HMAC-SHA256("s3cr3t", '{"postJobId":"1","channel":"instagram"}')
        assert_eq!(
            sign_payload("s3cr3t", &payload).unwrap(),
            "b21df7af18e84cb0c0861c26e43e40d3904d9b13ff580495f1165220c1f092f1"
        );
    }

    #[test]
    fn signature_depends_on_key_order() {
        let a = json!({ "postJobId": "1", "channel": "instagram" });
        let b = json!({ "channel": "instagram", "postJobId": "1" });

        let sig_a = sign_payload("s3cr3t", &a).unwrap();
        let sig_b = sign_payload("s3cr3t", &b).unwrap();
        assert_ne!(sig_a, sig_b);
    }

    #[test]
    fn rejects_tampered_or_truncated_signatures() {
        let payload = json!({ "postJobId": "1", "stage": "posted", "status": "success" });
        let verifier = SignatureVerifier::new(Some("s3cr3t".to_string()));
        let good = sign_payload("s3cr3t", &payload).unwrap();

        assert!(verifier.verify(&payload, &good).unwrap());
        assert!(!verifier.verify(&payload, &good[..10]).unwrap());
        assert!(!verifier.verify(&payload, &good.to_uppercase()).unwrap());

        let other_key = sign_payload("otro", &payload).unwrap();
        assert!(!verifier.verify(&payload, &other_key).unwrap());

        let tampered = json!({ "postJobId": "1", "stage": "posted", "status": "error" });
        assert!(!verifier.verify(&tampered, &good).unwrap());
    }

    #[test]
    fn without_secret_everything_passes() {
        let verifier = SignatureVerifier::new(None);
        assert!(!verifier.is_enabled());
        assert!(verifier.verify(&json!({}), "cualquier-cosa").unwrap());
    }
}
