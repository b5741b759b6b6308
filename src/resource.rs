use url::Url;

use crate::session::UserId;

/// The hosted project this client talks to: endpoint roots and the project API key.
/// This is the only provider configuration the library needs; it is opaque to everything above the [`client`](crate::client) module.
#[derive(Clone)]
pub struct ProjectResource {
    auth_root: Url,
    store_root: Url,
    api_key: String,
}

impl ProjectResource {
    /// Build a project resource. Both roots must be base URLs (they get paths joined onto them).
    pub fn new<S: AsRef<str>, T: AsRef<str>, U: ToString>(
        auth_root: S,
        store_root: T,
        api_key: U,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            auth_root: Url::parse(auth_root.as_ref())?,
            store_root: Url::parse(store_root.as_ref())?,
            api_key: api_key.to_string(),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The URL of an auth operation (`signUp`, `signInWithPassword`...), with the project key attached
    pub fn auth_endpoint(&self, operation: &str) -> Result<Url, url::ParseError> {
        let mut url = self.auth_root.join(&format!("accounts:{}", operation))?;
        url.set_query(Some(&format!("key={}", self.api_key)));
        Ok(url)
    }

    /// The URL of one user's planner document
    pub fn document_url(&self, user: &UserId) -> Result<Url, url::ParseError> {
        self.store_root.join(&format!("users/{}/planner", user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> ProjectResource {
        ProjectResource::new(
            "https://auth.example.com/v1/",
            "https://store.example.com/v1/",
            "some-api-key",
        )
        .unwrap()
    }

    #[test]
    fn auth_endpoints_carry_the_project_key() {
        let url = project().auth_endpoint("signUp").unwrap();
        assert_eq!(
            url.as_str(),
            "https://auth.example.com/v1/accounts:signUp?key=some-api-key"
        );
    }

    #[test]
    fn document_urls_are_per_user() {
        let url = project().document_url(&UserId::from("abc123")).unwrap();
        assert_eq!(url.as_str(), "https://store.example.com/v1/users/abc123/planner");
    }
}
