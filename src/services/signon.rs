//! Sign-on service
//!
//! One pass through [`SignOnService::invoke`] handles a full inbound HTTP
//! exchange: either correlating a returning response (SOAP back-channel,
//! artifact return or direct response) or initiating a new login attempt
//! (IdP selection, request construction, per-binding signing and dispatch).

use crate::cache::PendingLoginStore;
use crate::config::SpConfig;
use crate::error::{SignOnError, SignOnResult};
use crate::models::{
    AuthnRequest, IdentityProvider, IdpEndpoint, RequestContext, SamlBinding, SignOnAction,
    SignOnExchange, ValidatedAssertion,
};
use crate::services::collaborators::{
    AssertionHandler, ResponseProcessor, SoapBackchannel, SoapOutcome,
};
use crate::services::expected_responses::ExpectedResponses;
use crate::services::signer::SigningService;
use crate::session::{keys, take_override, SessionBridge};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::sync::Arc;

/// Artifact handle issued front-channel, resolved back-channel.
pub const PARAM_SAML_ARTIFACT: &str = "SAMLart";
/// Response delivered front-channel by the IdP.
pub const PARAM_SAML_RESPONSE: &str = "SamlResponse";
/// Opaque application context round-tripped through the IdP.
pub const PARAM_RELAY_STATE: &str = "RelayState";
/// Where to send the user after login completes.
pub const PARAM_RETURN_URL: &str = "ReturnUrl";
/// Marker set by the common-domain-cookie reader on its return redirect.
pub const PARAM_DISCOVERY_MARKER: &str = "r";
/// Explicit identity provider choice.
pub const PARAM_CHOSEN_IDP: &str = "cidp";

/// Outcome of IdP selection: either a provider to use, or a redirect the
/// selection logic itself requires. When the redirect fires, initiation
/// aborts immediately and no provider is touched afterwards.
enum IdpSelection<'a> {
    Selected(&'a IdentityProvider),
    Redirect(String),
}

/// The service-provider sign-on engine.
///
/// All collaborators are injected at construction; nothing is reached
/// through ambient state.
pub struct SignOnService {
    config: Arc<SpConfig>,
    signer: Arc<dyn SigningService>,
    backchannel: Arc<dyn SoapBackchannel>,
    response_processor: Arc<dyn ResponseProcessor>,
    cache: Arc<dyn PendingLoginStore>,
    expected: Arc<dyn ExpectedResponses>,
}

impl std::fmt::Debug for SignOnService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignOnService").finish_non_exhaustive()
    }
}

/// Builder for [`SignOnService`]; missing collaborators fail at build time,
/// never at request time.
#[derive(Default)]
pub struct SignOnServiceBuilder {
    config: Option<Arc<SpConfig>>,
    signer: Option<Arc<dyn SigningService>>,
    backchannel: Option<Arc<dyn SoapBackchannel>>,
    response_processor: Option<Arc<dyn ResponseProcessor>>,
    cache: Option<Arc<dyn PendingLoginStore>>,
    expected: Option<Arc<dyn ExpectedResponses>>,
}

impl SignOnServiceBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn config(mut self, config: Arc<SpConfig>) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn signer(mut self, signer: Arc<dyn SigningService>) -> Self {
        self.signer = Some(signer);
        self
    }

    #[must_use]
    pub fn backchannel(mut self, backchannel: Arc<dyn SoapBackchannel>) -> Self {
        self.backchannel = Some(backchannel);
        self
    }

    #[must_use]
    pub fn response_processor(mut self, processor: Arc<dyn ResponseProcessor>) -> Self {
        self.response_processor = Some(processor);
        self
    }

    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn PendingLoginStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn expected_responses(mut self, expected: Arc<dyn ExpectedResponses>) -> Self {
        self.expected = Some(expected);
        self
    }

    pub fn build(self) -> SignOnResult<SignOnService> {
        Ok(SignOnService {
            config: self
                .config
                .ok_or(SignOnError::MissingCollaborator("config"))?,
            signer: self
                .signer
                .ok_or(SignOnError::MissingCollaborator("signer"))?,
            backchannel: self
                .backchannel
                .ok_or(SignOnError::MissingCollaborator("backchannel"))?,
            response_processor: self
                .response_processor
                .ok_or(SignOnError::MissingCollaborator("response_processor"))?,
            cache: self.cache.ok_or(SignOnError::MissingCollaborator("cache"))?,
            expected: self
                .expected
                .ok_or(SignOnError::MissingCollaborator("expected_responses"))?,
        })
    }
}

impl SignOnService {
    #[must_use]
    pub fn builder() -> SignOnServiceBuilder {
        SignOnServiceBuilder::new()
    }

    #[must_use]
    pub fn config(&self) -> &SpConfig {
        &self.config
    }

    /// Handle one inbound exchange.
    ///
    /// Exactly one of four mutually exclusive paths executes, in priority
    /// order: SOAP back-channel, artifact return, direct response, login
    /// initiation. The SOAP path short-circuits the others even when
    /// `SAMLart` or `SamlResponse` parameters are also present.
    pub async fn invoke(
        &self,
        exchange: &SignOnExchange,
        session: &dyn SessionBridge,
        on_assertion: &dyn AssertionHandler,
    ) -> SignOnResult<SignOnAction> {
        let mut context = RequestContext::new();
        self.invoke_with_context(exchange, session, on_assertion, &mut context)
            .await
    }

    /// Like [`invoke`](Self::invoke), with a caller-visible per-request
    /// context store (the last-attempted IdP id is dual-written there for
    /// callers without session support).
    pub async fn invoke_with_context(
        &self,
        exchange: &SignOnExchange,
        session: &dyn SessionBridge,
        on_assertion: &dyn AssertionHandler,
        context: &mut RequestContext,
    ) -> SignOnResult<SignOnAction> {
        // 1. Back-channel SOAP. Header presence alone decides, even with an
        // empty value.
        if exchange.is_soap() {
            tracing::debug!("inbound SOAP envelope on the back channel");
            return self.handle_soap_body(&exchange.body, session, on_assertion).await;
        }

        // 2. Artifact return leg: resolve back-channel, then re-enter as a
        // SOAP-style inbound message.
        if let Some(artifact) = exchange.param(PARAM_SAML_ARTIFACT).filter(|a| !a.is_empty()) {
            tracing::info!(artifact = %artifact, "resolving returned artifact");
            let body = self
                .backchannel
                .resolve_artifact(artifact, exchange.param(PARAM_RELAY_STATE), &self.config)
                .await?;
            return self.handle_soap_body(&body, session, on_assertion).await;
        }

        // 3. Direct response on the front channel.
        if let Some(raw) = exchange.param(PARAM_SAML_RESPONSE) {
            let assertion = self
                .response_processor
                .handle_response(&self.config, raw, session, &*self.cache)
                .await?;
            self.complete_sign_on(&assertion, on_assertion).await?;
            return Ok(SignOnAction::Completed);
        }

        // 4. No response present: initiate a new login attempt.
        self.initiate_sign_on(exchange, session, context).await
    }

    async fn handle_soap_body(
        &self,
        body: &[u8],
        session: &dyn SessionBridge,
        on_assertion: &dyn AssertionHandler,
    ) -> SignOnResult<SignOnAction> {
        match self
            .backchannel
            .handle_soap(body, &self.config, on_assertion, &*self.cache, session)
            .await?
        {
            SoapOutcome::Envelope(xml) => Ok(SignOnAction::SoapEnvelope(xml)),
            SoapOutcome::Completed => Ok(SignOnAction::Completed),
        }
    }

    async fn initiate_sign_on(
        &self,
        exchange: &SignOnExchange,
        session: &dyn SessionBridge,
        context: &mut RequestContext,
    ) -> SignOnResult<SignOnAction> {
        tracing::warn!("unauthenticated access, initiating sign-on");

        // The originally requested return target must survive every
        // redirect that follows, including the discovery round trip.
        if let Some(return_url) = exchange.param(PARAM_RETURN_URL) {
            session
                .set(keys::RETURN_URL, return_url.to_string())
                .await;
        }

        // Common-domain-cookie discovery: fires only when enabled and the
        // request carries neither the round-trip marker nor an explicit
        // IdP choice.
        if let Some(cdc) = &self.config.common_domain_cookie {
            if cdc.enabled
                && exchange.param(PARAM_DISCOVERY_MARKER).is_none()
                && exchange.param(PARAM_CHOSEN_IDP).is_none()
            {
                let return_url = format!("{}?{}=1", self.config.sign_on_url, PARAM_DISCOVERY_MARKER);
                let target = format!(
                    "{}?returnUrl={}",
                    cdc.local_reader_endpoint,
                    urlencoding::encode(&return_url)
                );
                tracing::debug!(target = %target, "redirecting to common-domain-cookie reader");
                return Ok(SignOnAction::Redirect(target));
            }
        }

        let idp = match self.select_identity_provider(exchange)? {
            IdpSelection::Redirect(url) => {
                // Selection needed the browser elsewhere; abort initiation.
                return Ok(SignOnAction::Redirect(url));
            }
            IdpSelection::Selected(idp) => idp,
        };

        let mut request = AuthnRequest::new(&self.config.entity_id);
        let endpoint = self
            .configure_request(idp, &mut request, session, context)
            .await?;

        self.dispatch(&endpoint, request, exchange.param(PARAM_RELAY_STATE))
            .await
    }

    /// Resolve which identity provider to use, in priority order: explicit
    /// request choice, configured default, single configured provider,
    /// configured selection endpoint (as a redirect). Anything else is a
    /// hard failure — an IdP-picker UI is not built here.
    fn select_identity_provider(
        &self,
        exchange: &SignOnExchange,
    ) -> SignOnResult<IdpSelection<'_>> {
        if let Some(id) = exchange.param(PARAM_CHOSEN_IDP) {
            return self
                .config
                .identity_provider(id)
                .map(IdpSelection::Selected)
                .ok_or_else(|| SignOnError::IdpNotFound(id.to_string()));
        }

        if let Some(id) = &self.config.default_identity_provider {
            return self
                .config
                .identity_provider(id)
                .map(IdpSelection::Selected)
                .ok_or_else(|| SignOnError::IdpNotFound(id.clone()));
        }

        if self.config.identity_providers.len() == 1 {
            return Ok(IdpSelection::Selected(&self.config.identity_providers[0]));
        }

        if let Some(url) = &self.config.idp_selection_url {
            return Ok(IdpSelection::Redirect(url.clone()));
        }

        Err(SignOnError::IdpSelectionUnavailable)
    }

    /// Configure the outgoing request for the chosen provider and return
    /// the destination endpoint. Deterministic given (IdP, request,
    /// session); no transport side effects.
    async fn configure_request(
        &self,
        idp: &IdentityProvider,
        request: &mut AuthnRequest,
        session: &dyn SessionBridge,
        context: &mut RequestContext,
    ) -> SignOnResult<IdpEndpoint> {
        let endpoint = idp
            .resolve_sign_on_endpoint()
            .ok_or_else(|| SignOnError::SignOnEndpointMissing(idp.id.clone()))?
            .clone();
        request.destination = endpoint.url.clone();

        // Dual-write the last-attempted IdP id: session for the return
        // leg, request context for callers without session support.
        session.set(keys::IDP_ID, idp.id.clone()).await;
        context.insert(keys::IDP_ID, idp.id.clone());

        request.force_authn = idp.force_authn;
        request.is_passive = idp.is_passive;

        // One-shot session overrides, cleared on read regardless of value.
        if let Some(force_authn) = take_override(session, keys::FORCE_AUTHN).await {
            request.force_authn = force_authn;
        }
        if let Some(is_passive) = take_override(session, keys::IS_PASSIVE).await {
            request.is_passive = is_passive;
        }

        if let Some(binding) = &endpoint.force_protocol_binding {
            request.protocol_binding = Some(binding.clone());
        }

        self.expected.register(&request.id, &idp.id).await?;

        Ok(endpoint)
    }

    /// Per-binding signing and dispatch. Each arm returns a transport
    /// action; failures inside signing or serialization are terminal (a
    /// single redirect, post or artifact issuance is not safe to retry
    /// silently).
    async fn dispatch(
        &self,
        endpoint: &IdpEndpoint,
        mut request: AuthnRequest,
        relay_state: Option<&str>,
    ) -> SignOnResult<SignOnAction> {
        let binding = SamlBinding::from_uri(&endpoint.binding)
            .ok_or_else(|| SignOnError::EndpointBindingInvalid(endpoint.binding.clone()))?;

        match binding {
            SamlBinding::Redirect => {
                // No protocol-binding hint: the IdP infers the response
                // binding from the receiving endpoint.
                let xml = request.to_xml();
                tracing::info!(
                    request_id = %request.id,
                    destination = %request.destination,
                    "sending AuthnRequest via HTTP-Redirect"
                );
                let query = self.signer.signed_query_string(&xml, relay_state)?;
                let separator = if endpoint.url.contains('?') { '&' } else { '?' };
                Ok(SignOnAction::Redirect(format!(
                    "{}{}{}",
                    endpoint.url, separator, query
                )))
            }
            SamlBinding::Post => {
                if request.protocol_binding.is_none() {
                    request.protocol_binding = Some(SamlBinding::Post.uri().to_string());
                }
                let xml = request.to_xml();
                // A body payload gets the stronger integrity binding: the
                // document itself is signed, not just a query string.
                let signed = self.signer.sign_document(&xml)?;
                tracing::info!(
                    request_id = %request.id,
                    destination = %request.destination,
                    "sending AuthnRequest via HTTP-POST"
                );
                Ok(SignOnAction::HtmlForm(build_post_form(
                    &endpoint.url,
                    &signed,
                    relay_state,
                )))
            }
            SamlBinding::Artifact => {
                if request.protocol_binding.is_none() {
                    request.protocol_binding = Some(SamlBinding::Artifact.uri().to_string());
                }
                tracing::info!(
                    request_id = %request.id,
                    destination = %request.destination,
                    "sending AuthnRequest via HTTP-Artifact"
                );
                // No local signing: the back-channel builder signs, encodes
                // and registers the pending-login entry.
                let url = self
                    .backchannel
                    .issue_artifact(&request, &self.config, relay_state, &*self.cache)
                    .await?;
                Ok(SignOnAction::Redirect(url))
            }
        }
    }

    /// Completion routine shared by all three inbound paths. Writing
    /// authentication state into the caller's identity model is the
    /// handler's job, not ours.
    async fn complete_sign_on(
        &self,
        assertion: &ValidatedAssertion,
        on_assertion: &dyn AssertionHandler,
    ) -> SignOnResult<()> {
        tracing::info!(
            subject = %assertion.subject,
            subject_format = %assertion.subject_format,
            session_index = assertion.session_index.as_deref().unwrap_or(""),
            "sign-on completed"
        );
        on_assertion.complete(assertion).await
    }
}

/// Self-submitting HTML form carrying the signed request (POST binding).
#[must_use]
pub fn build_post_form(action_url: &str, signed_xml: &str, relay_state: Option<&str>) -> String {
    let payload = STANDARD.encode(signed_xml.as_bytes());
    let relay_input = relay_state
        .map(|rs| {
            format!(
                r#"<input type="hidden" name="RelayState" value="{}"/>"#,
                html_escape(rs)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>SAML Sign-On</title>
</head>
<body onload="document.forms[0].submit()">
    <noscript>
        <p>JavaScript is disabled. Click the button below to continue.</p>
    </noscript>
    <form method="POST" action="{}">
        <input type="hidden" name="SAMLRequest" value="{}"/>
        {}
        <noscript>
            <input type="submit" value="Continue"/>
        </noscript>
    </form>
</body>
</html>"#,
        html_escape(action_url),
        html_escape(&payload),
        relay_input
    )
}

/// HTML escape for XSS prevention
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
