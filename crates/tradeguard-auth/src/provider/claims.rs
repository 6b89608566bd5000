//! Mapping of userinfo claims to a [`ProviderIdentity`].

use serde_json::Value;

use tradeguard_core::error::ControlPlaneError;

use super::ProviderIdentity;

/// Read standard and namespaced custom claims from a userinfo document.
///
/// Custom claims are looked up as `{namespace}roles`, `{namespace}client_ids`
/// (or `{namespace}clientIds`), and `{namespace}plan`.
pub fn identity_from_claims(
    claims: &Value,
    namespace: &str,
) -> Result<ProviderIdentity, ControlPlaneError> {
    let sub = claims
        .get("sub")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ControlPlaneError::identity_provider("userinfo response has no subject"))?;

    let namespaced = |name: &str| claims.get(format!("{namespace}{name}"));

    let client_ids = namespaced("client_ids")
        .or_else(|| namespaced("clientIds"))
        .map(string_list)
        .unwrap_or_default();

    Ok(ProviderIdentity {
        sub: sub.to_string(),
        email: string_claim(claims.get("email")),
        name: string_claim(claims.get("name")),
        plan: string_claim(namespaced("plan")),
        roles: namespaced("roles").map(string_list).unwrap_or_default(),
        client_ids,
    })
}

fn string_claim(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Value::String(single) if !single.is_empty() => vec![single.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_namespaced_claims() {
        let claims = json!({
            "sub": "auth0|7",
            "email": "ops@acme.io",
            "https://tradeguard.app/roles": ["owner", "trader"],
            "https://tradeguard.app/client_ids": ["acme"],
            "https://tradeguard.app/plan": "pro"
        });
        let identity = identity_from_claims(&claims, "https://tradeguard.app/").unwrap();
        assert_eq!(identity.sub, "auth0|7");
        assert_eq!(identity.roles, vec!["owner", "trader"]);
        assert_eq!(identity.client_ids, vec!["acme"]);
        assert_eq!(identity.plan.as_deref(), Some("pro"));
        assert_eq!(identity.name, None);
    }

    #[test]
    fn test_camel_case_client_ids_and_scalar() {
        let claims = json!({ "sub": "u", "ns/clientIds": "solo" });
        let identity = identity_from_claims(&claims, "ns/").unwrap();
        assert_eq!(identity.client_ids, vec!["solo"]);
    }

    #[test]
    fn test_missing_subject_is_provider_error() {
        let err = identity_from_claims(&json!({}), "ns/").unwrap_err();
        assert_eq!(err.code(), "identity_provider_error");
    }
}
