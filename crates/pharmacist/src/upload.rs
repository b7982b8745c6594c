//! File uploads for patient documents.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::{debug, instrument};

use crate::client::PharmacistClient;
use crate::error::PharmacistError;
use crate::types::ApiResponse;

impl PharmacistClient {
    /// Upload a file as the multipart field `fileName`.
    ///
    /// The returned body names the stored file, which
    /// [`PatientDocument::file_name`](crate::PatientDocument) then references.
    ///
    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self, contents), fields(file_name = %file_name, size = contents.len()))]
    pub async fn upload_file(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<ApiResponse, PharmacistError> {
        self.guard()
            .run(|| async {
                let form = Form::new().part(
                    "fileName",
                    Part::bytes(contents).file_name(file_name.to_string()),
                );
                let url = self.url(&["pharmacist", "docUpload"])?;
                let request = self.request(Method::POST, url).await?.multipart(form);
                let response = self.send(request).await?;
                debug!(status = response.status, "Uploaded file");
                Ok(response)
            })
            .await
    }
}
