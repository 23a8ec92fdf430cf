// Registration code endpoints
//
// One-time device provisioning codes: generate, list (active-only or all),
// and revoke.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::client::BackendClient;
use crate::error::Error;
use crate::models::{
    Decoded, GenerateCodeBody, GenerateCodeResponse, ListResponse, LocationRecord,
    RegistrationCodeRecord, RevokeCodeBody,
};

impl BackendClient {
    /// Ask the backend to mint a new code. The token itself is generated
    /// server-side.
    ///
    /// `POST v1/registration-codes`
    pub async fn generate_registration_code(
        &self,
        farm_id: &str,
        device_name: &str,
        location: Option<&LocationRecord>,
        expires_at: DateTime<Utc>,
    ) -> Result<GenerateCodeResponse, Error> {
        let url = self.url(&["v1", "registration-codes"])?;
        debug!(farm_id, device_name, %expires_at, "generating registration code");
        self.post(
            url,
            &GenerateCodeBody {
                farm_id,
                device_name,
                location,
                expires_at,
            },
        )
        .await
    }

    /// Codes that are unused and not yet expired at `now`, latest expiry first.
    ///
    /// `GET v1/registration-codes?used=false&expiresAfter={now}&orderBy=expires_at&direction=desc`
    pub async fn list_active_registration_codes(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Decoded<RegistrationCodeRecord>>, Error> {
        let url = self.url(&["v1", "registration-codes"])?;
        debug!(%now, "listing active registration codes");
        let page: ListResponse = self
            .get_with_params(
                url,
                &[
                    ("used", "false".to_owned()),
                    (
                        "expiresAfter",
                        now.to_rfc3339_opts(SecondsFormat::Millis, true),
                    ),
                    ("orderBy", "expires_at".to_owned()),
                    ("direction", "desc".to_owned()),
                ],
            )
            .await?;
        Ok(page.decode_each())
    }

    /// Every code the caller can see, newest first.
    ///
    /// `GET v1/registration-codes?orderBy=created_at&direction=desc`
    pub async fn list_registration_codes(
        &self,
    ) -> Result<Vec<Decoded<RegistrationCodeRecord>>, Error> {
        let url = self.url(&["v1", "registration-codes"])?;
        debug!("listing registration codes");
        let page: ListResponse = self
            .get_with_params(
                url,
                &[
                    ("orderBy", "created_at".to_owned()),
                    ("direction", "desc".to_owned()),
                ],
            )
            .await?;
        Ok(page.decode_each())
    }

    /// Revoke a code by marking it used and stamping `revoked_at`.
    ///
    /// `PATCH v1/registration-codes/{id}` with `{"used": true, "revoked_at": ...}`
    pub async fn revoke_registration_code(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let url = self.url(&["v1", "registration-codes", id])?;
        debug!(id, "revoking registration code");
        self.patch_no_response(
            url,
            &RevokeCodeBody {
                used: true,
                revoked_at: at,
            },
        )
        .await
    }
}
