//! Asynchronous variables client implementation.

use std::sync::Arc;

use tfe_core::config::TfeClientConfig;
use tfe_core::id::VariableId;
use tfe_core::jsonapi::Document;
use tfe_core::transport::{ApiRequest, HttpTransport, Transport};
use tfe_core::Error;
use tracing::debug;

use crate::models::{
    Variable, VariableCreateOptions, VariableList, VariableListOptions, VariableUpdateOptions,
};
use crate::Result;

const VARIABLES_PATH: &str = "vars";

/// Client for the `vars` endpoints.
///
/// Holds no mutable state; clones share the same transport.
#[derive(Clone)]
pub struct VariablesClient {
    transport: Arc<dyn Transport>,
}

impl VariablesClient {
    /// Create a client on top of an existing transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Construct a client backed by [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the transport cannot be built.
    pub fn from_config(config: &TfeClientConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// List the variables of a workspace, in server order.
    ///
    /// No matches is an empty vector, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] naming `Organization` or `Workspace`
    /// before any request is sent, or the transport's error.
    pub async fn list(&self, options: &VariableListOptions) -> Result<Vec<Variable>> {
        self.list_page(options).await.map(|page| page.items)
    }

    /// List one page of variables together with pagination details.
    ///
    /// # Errors
    ///
    /// Same as [`VariablesClient::list`].
    pub async fn list_page(&self, options: &VariableListOptions) -> Result<VariableList> {
        options.validate()?;

        let request = ApiRequest::get(VARIABLES_PATH).with_query(options.to_pairs());
        let document = self
            .transport
            .send(request)
            .await?
            .ok_or_else(|| Error::DecodeError("empty response listing variables".to_string()))?;

        let pagination = document.pagination().copied();
        let items = document.into_many()?;
        Ok(VariableList { items, pagination })
    }

    /// Create a variable.
    ///
    /// Any caller-supplied `id` is discarded. The `workspace` of the returned
    /// variable does not reliably reflect the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] for the first missing of Key, Value,
    /// Category and Workspace, or the transport's error.
    pub async fn create(&self, mut options: VariableCreateOptions) -> Result<Variable> {
        options.validate()?;

        if options.id.take().is_some() {
            debug!("discarding caller-supplied variable ID on create");
        }

        let body = Document::encode(&options)?;
        let document = self
            .transport
            .send(ApiRequest::post(VARIABLES_PATH, body))
            .await?;
        single_variable(document)
    }

    /// Read a variable by ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] for a malformed ID, or the
    /// transport's error ([`Error::NotFound`] if it does not exist).
    pub async fn read(&self, variable_id: &str) -> Result<Variable> {
        let variable_id = VariableId::parse_str(variable_id)?;
        let document = self
            .transport
            .send(ApiRequest::get(variable_path(&variable_id)))
            .await?;
        single_variable(document)
    }

    /// Update a variable. Only fields set in `options` are sent.
    ///
    /// Setting `sensitive` to true redacts the value in the returned variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] for a malformed ID before any
    /// request is sent, or the transport's error.
    pub async fn update(
        &self,
        variable_id: &str,
        mut options: VariableUpdateOptions,
    ) -> Result<Variable> {
        let variable_id = VariableId::parse_str(variable_id)?;

        // The payload ID must match the path.
        options.id = Some(variable_id.to_string());

        let body = Document::encode(&options)?;
        let document = self
            .transport
            .send(ApiRequest::patch(variable_path(&variable_id), body))
            .await?;
        single_variable(document)
    }

    /// Delete a variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] for a malformed ID before any
    /// request is sent, or the transport's error ([`Error::NotFound`] if the
    /// server does not know the ID).
    pub async fn delete(&self, variable_id: &str) -> Result<()> {
        let variable_id = VariableId::parse_str(variable_id)?;
        self.transport
            .send(ApiRequest::delete(variable_path(&variable_id)))
            .await
            .map(|_| ())
    }
}

fn variable_path(variable_id: &VariableId) -> String {
    format!("{VARIABLES_PATH}/{variable_id}")
}

fn single_variable(document: Option<Document>) -> Result<Variable> {
    document
        .ok_or_else(|| Error::DecodeError("empty response for variable".to_string()))?
        .into_one()
}
