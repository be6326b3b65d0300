mod models;

use crate::common::{envelope, paths, TokenGrant};
pub use models::*;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::cookie_jar::PersistentCookieJar;

const DEVICE_ID_HEADER: &str = "X-Device-Id";

/// HTTP client for the auth service.
///
/// Sends every request through a persistent cookie jar: the refresh credential
/// is an HTTP-only cookie set by login, OTP verification or the OAuth callback,
/// and the refresh call only works if that cookie rides along, even after a
/// restart.
pub struct AuthClient {
    http_client: Client,
    base_url: String,
    device_id: String,
}

impl AuthClient {
    pub fn new(
        base_url: impl Into<String>,
        device_id: impl Into<String>,
        timeout: Duration,
        cookies: Arc<PersistentCookieJar>,
    ) -> Result<Self, AuthClientError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .cookie_provider(cookies)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            device_id: device_id.into(),
        })
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthClientError> {
        let data = self
            .send(self.post(paths::LOGIN).json(&LoginRequest { email, password }))
            .await?;

        let otp_required = data
            .get("otpRequired")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if otp_required {
            Ok(LoginOutcome::OtpRequired(decode(data)?))
        } else {
            Ok(LoginOutcome::Authenticated(decode(data)?))
        }
    }

    pub async fn register(&self, registration: &Registration) -> Result<OtpChallenge, AuthClientError> {
        let data = self
            .send(self.post(paths::REGISTER).json(registration))
            .await?;
        decode(data)
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<TokenGrant, AuthClientError> {
        let data = self
            .send(self.post(paths::VERIFY_OTP).json(&OtpVerification { email, otp }))
            .await?;
        decode(data)
    }

    pub async fn resend_otp(&self, email: &str) -> Result<OtpChallenge, AuthClientError> {
        let data = self
            .send(self.post(paths::RESEND_OTP).json(&EmailRequest { email }))
            .await?;
        decode(data)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthClientError> {
        self.send(self.post(paths::FORGOT_PASSWORD).json(&EmailRequest { email }))
            .await?;
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthClientError> {
        let req = ResetPasswordRequest {
            token,
            new_password,
        };
        self.send(self.post(paths::RESET_PASSWORD).json(&req))
            .await?;
        Ok(())
    }

    /// OAuth initiate: ask the backend where to send the user.
    pub async fn oauth_authorization_url(
        &self,
        provider: OAuthProvider,
    ) -> Result<OAuthAuthorization, AuthClientError> {
        let path = format!("{}/{}/authorize", paths::OAUTH2, provider.as_str());
        let data = self.send(self.request(Method::GET, &path)).await?;
        decode(data)
    }

    pub async fn oauth_callback(
        &self,
        provider: OAuthProvider,
        code: &str,
        state: &str,
    ) -> Result<TokenGrant, AuthClientError> {
        let path = format!("{}/{}/callback", paths::OAUTH2, provider.as_str());
        let data = self
            .send(self.post(&path).json(&OAuthCallbackRequest { code, state }))
            .await?;
        decode(data)
    }

    /// POST with no body; the refresh cookie is the credential.
    pub async fn refresh_token(&self) -> Result<TokenGrant, AuthClientError> {
        let data = self.send(self.post(paths::REFRESH)).await?;
        decode(data)
    }

    pub async fn logout(&self, access_token: Option<&str>) -> Result<(), AuthClientError> {
        let mut builder = self.post(paths::LOGOUT);
        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }
        self.send(builder).await?;
        Ok(())
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client
            .request(method, format!("{}{}", self.base_url, path))
            .header(DEVICE_ID_HEADER, &self.device_id)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Value, AuthClientError> {
        let response = builder.send().await?;
        read_envelope(response).await
    }
}

/// Normalise a response into its envelope payload, mapping both transport and
/// embedded status codes onto the error enum.
async fn read_envelope(response: Response) -> Result<Value, AuthClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    let body: Option<Value> = serde_json::from_slice(&bytes).ok();

    check_status(status.as_u16(), body.as_ref(), status.canonical_reason())?;

    let body = body.unwrap_or(Value::Null);
    if let Some(embedded) = envelope::embedded_status(&body) {
        check_status(embedded, Some(&body), None)?;
    }

    Ok(envelope::into_data(body))
}

fn check_status(
    status: u16,
    body: Option<&Value>,
    reason: Option<&str>,
) -> Result<(), AuthClientError> {
    if !envelope::is_failure(status) {
        return Ok(());
    }

    let message = body
        .and_then(envelope::error_message)
        .or_else(|| reason.map(str::to_string))
        .unwrap_or_else(|| format!("status {}", status));

    match status {
        401 => Err(AuthClientError::Unauthorized(message)),
        403 => Err(AuthClientError::Forbidden(message)),
        _ => Err(AuthClientError::Server { status, message }),
    }
}

fn decode<T: DeserializeOwned>(data: Value) -> Result<T, AuthClientError> {
    serde_json::from_value(data).map_err(|e| AuthClientError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn embedded_unauthorized_is_detected() {
        let body = json!({"status": 401, "message": "token expired"});
        let err = check_status(401, Some(&body), None).unwrap_err();
        assert!(matches!(err, AuthClientError::Unauthorized(msg) if msg == "token expired"));
    }

    #[test]
    fn server_error_falls_back_to_reason() {
        let err = check_status(502, None, Some("Bad Gateway")).unwrap_err();
        assert!(matches!(
            err,
            AuthClientError::Server { status: 502, ref message } if message == "Bad Gateway"
        ));
    }

    #[test]
    fn success_passes() {
        assert!(check_status(204, None, None).is_ok());
    }

    #[test]
    fn malformed_grant_is_reported() {
        let err = decode::<TokenGrant>(json!({"username": "ana"})).unwrap_err();
        assert!(matches!(err, AuthClientError::Malformed(_)));
    }
}
