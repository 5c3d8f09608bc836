use crate::config::EngineConfig;
use directory_cache::{CacheStore, QueryCache};
use directory_protocol::{
    Channel, DirectoryRecord, ErrorCode, Intent, RankedResult, SessionAction, TurnRequest,
    TurnResponse, WhatsappTemplate,
};
use directory_search::{
    DirectoryCatalog, HybridResolver, IntentResolver, RawHit, ResultFormatter, SearchError,
    VectorSearchBackend,
};
use directory_session::{MembershipRoster, SessionManager, SessionStore, TurnSession};
use std::sync::Arc;
use std::time::Instant;

/// Top-level orchestrator: one call per conversational turn.
///
/// Every turn produces a [`TurnResponse`]; failures of any collaborator are
/// folded into the envelope at this boundary and never propagate.
pub struct DirectoryEngine {
    sessions: SessionManager,
    resolver: HybridResolver,
    catalog: Arc<dyn DirectoryCatalog>,
    formatter: ResultFormatter,
    default_limit: usize,
}

impl DirectoryEngine {
    pub fn new(
        backend: Arc<dyn VectorSearchBackend>,
        catalog: Arc<dyn DirectoryCatalog>,
        roster: Arc<dyn MembershipRoster>,
        session_store: Arc<dyn SessionStore>,
        cache_store: Arc<dyn CacheStore>,
        config: EngineConfig,
    ) -> Self {
        let formatter =
            ResultFormatter::new(&config.links.card_base_url, &config.links.vcard_base_url);
        let cache = QueryCache::new(cache_store, config.cache.ttl());
        let resolver = HybridResolver::new(
            backend,
            catalog.clone(),
            cache,
            formatter.clone(),
            config.search.clone(),
        );
        let sessions = SessionManager::new(session_store, roster, config.session.ttl());

        Self {
            sessions,
            resolver,
            catalog,
            formatter,
            default_limit: config.search.default_limit,
        }
    }

    /// Process one inbound turn end to end.
    pub async fn handle_turn(&self, request: TurnRequest) -> TurnResponse {
        let started = Instant::now();
        let intent = IntentResolver::resolve(
            request.intent.as_deref(),
            request.message.as_deref(),
            request.channel,
        );
        log::debug!("Turn: intent={} channel={:?}", intent.as_str(), request.channel);

        let mut response = TurnResponse::empty(intent, request.channel);

        let Some(identity) = request.identity().map(str::to_string) else {
            fail(&mut response, ErrorCode::MissingIdentity, "Please provide a phone number or user id.");
            return finalize(response, request.channel, started);
        };

        let scope = request
            .group_id
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string);
        // The cross-scope contact lookup is the one capability that works
        // without a scope.
        if scope.is_none() && intent != Intent::GetContact {
            fail(&mut response, ErrorCode::MissingScope, "Please provide a directory group.");
            return finalize(response, request.channel, started);
        }

        // A goodbye turn is an implicit session end.
        let action = if intent == Intent::Goodbye {
            SessionAction::End
        } else {
            request.session_action
        };

        let turn = match &scope {
            Some(scope_id) => {
                let turn = self.sessions.open(&identity, scope_id, action).await;
                response.group_id = Some(scope_id.clone());
                response.group_name = self.catalog.scope_name(scope_id).await.ok().flatten();
                turn
            }
            None => TurnSession::default(),
        };
        response.session_id = turn.session_id().map(str::to_string);
        response.is_new_session = turn.is_new;
        response.is_member = turn.is_member;

        if action == SessionAction::End {
            response.response_type = if intent == Intent::Goodbye {
                "goodbye".to_string()
            } else {
                "session_ended".to_string()
            };
            response.message = "Goodbye! Message us any time to search the directory again.".to_string();
            return finalize(response, request.channel, started);
        }

        self.dispatch(intent, scope.as_deref().unwrap_or_default(), &request, &turn, &mut response)
            .await;

        // Best-effort turn recording; never awaited for correctness.
        if let Some(session) = &turn.session {
            self.sessions.record_turn(session, intent, request.message.as_deref());
        }

        finalize(response, request.channel, started)
    }

    /// `scope` is the validated, trimmed scope id; empty only on the
    /// contact-lookup path, which is the one capability that ignores it.
    async fn dispatch(
        &self,
        intent: Intent,
        scope: &str,
        request: &TurnRequest,
        turn: &TurnSession,
        response: &mut TurnResponse,
    ) {
        match intent {
            Intent::Welcome => {
                response.response_type = "welcome".to_string();
                let group = response.group_name.as_deref().unwrap_or("the directory");
                response.message = if turn.is_member {
                    format!("Welcome back to {group}! What would you like to find today?")
                } else {
                    format!("Welcome to {group}! Ask me for any business, product or service.")
                };
            }
            Intent::Explore | Intent::Unknown => {
                response.response_type = "menu".to_string();
                response.message = concat!(
                    "Here is what I can do:\n",
                    "1. List the directory segments\n",
                    "2. List members\n",
                    "3. Search for a business, product or service\n",
                    "Just type what you are looking for."
                )
                .to_string();
            }
            Intent::ListSegments => self.list_segments(scope, response).await,
            Intent::ListMembers => self.list_members(scope, request, response).await,
            Intent::Search => self.search(scope, request, response).await,
            Intent::GetContact => self.contact(request, response, "contact").await,
            Intent::About => self.contact(request, response, "about").await,
            // Goodbye is rewritten to a session end before dispatch.
            Intent::Goodbye => {}
        }
    }

    async fn list_segments(&self, scope: &str, response: &mut TurnResponse) {
        match self.catalog.segments(scope).await {
            Ok(segments) if segments.is_empty() => {
                response.response_type = "segments".to_string();
                response.message = "This directory has no segments yet.".to_string();
            }
            Ok(segments) => {
                response.response_type = "segments".to_string();
                response.message = format!("Directory segments: {}.", segments.join(", "));
            }
            Err(err) => {
                log::warn!("Segment listing failed: {}", err);
                fail(response, ErrorCode::BackendUnavailable, "The directory is unavailable right now, please try again.");
            }
        }
    }

    async fn list_members(
        &self,
        scope: &str,
        request: &TurnRequest,
        response: &mut TurnResponse,
    ) {
        let limit = request.params.limit.unwrap_or(self.default_limit).max(1);
        let offset = request.params.offset.unwrap_or(0);
        let segment = request.params.segment.as_deref();

        match self.catalog.members(scope, segment, limit, offset).await {
            Ok(rows) => {
                response.response_type = "members".to_string();
                response.message = match (rows.len(), segment) {
                    (0, Some(segment)) => format!("No members found in \"{segment}\"."),
                    (0, None) => "No members found.".to_string(),
                    (n, Some(segment)) => format!("{n} member(s) in \"{segment}\":"),
                    (n, None) => format!("{n} member(s):"),
                };
                self.set_results(response, rows.into_iter().map(RawHit::Fallback).collect());
            }
            Err(err) => {
                log::warn!("Member listing failed: {}", err);
                fail(response, ErrorCode::BackendUnavailable, "The directory is unavailable right now, please try again.");
            }
        }
    }

    async fn search(&self, scope: &str, request: &TurnRequest, response: &mut TurnResponse) {
        let query = request
            .params
            .query
            .as_deref()
            .or(request.message.as_deref())
            .unwrap_or_default();
        let embedding = request.params.embedding.as_deref();

        match self
            .resolver
            .resolve(query, scope, embedding, request.params.limit)
            .await
        {
            Ok(outcome) => {
                response.response_type = "results".to_string();
                response.message = outcome.message;
                response.from_cache = outcome.from_cache;
                response.results_count = outcome.results.len();
                response.results = outcome.results;
            }
            Err(SearchError::EmptyQuery) => {
                fail(response, ErrorCode::EmptyQuery, "Please provide a search query.");
            }
            Err(SearchError::MissingEmbedding) => {
                fail(response, ErrorCode::MissingEmbedding, "Search requires an embedding for this group.");
            }
            Err(SearchError::Backend(err)) => {
                log::warn!("Search failed on the critical path: {}", err);
                fail(response, ErrorCode::BackendUnavailable, "Search failed, please try again.");
            }
        }
    }

    async fn contact(
        &self,
        request: &TurnRequest,
        response: &mut TurnResponse,
        response_type: &str,
    ) {
        let membership_id = request.params.membership_id.as_deref();
        let business_name = request
            .params
            .business_name
            .as_deref()
            .or(request.message.as_deref());

        match self.catalog.find_contact(membership_id, business_name).await {
            Ok(Some(record)) => {
                response.response_type = response_type.to_string();
                response.detail_level = "full".to_string();
                response.message = format!("Contact card for {}.", record.name);
                self.set_results(response, vec![full_confidence_hit(record)]);
            }
            Ok(None) => {
                // Not an error: a valid empty outcome, same as zero search hits.
                response.response_type = response_type.to_string();
                response.message = "No matching contact found.".to_string();
            }
            Err(err) => {
                log::warn!("Contact lookup failed: {}", err);
                fail(response, ErrorCode::BackendUnavailable, "The directory is unavailable right now, please try again.");
            }
        }
    }

    fn set_results(&self, response: &mut TurnResponse, hits: Vec<RawHit>) {
        let results: Vec<RankedResult> = self.formatter.format(hits);
        response.results_count = results.len();
        response.results = results;
    }
}

/// An exact lookup is reported at full similarity.
fn full_confidence_hit(record: DirectoryRecord) -> RawHit {
    RawHit::Vector {
        record,
        similarity: 1.0,
    }
}

fn fail(response: &mut TurnResponse, code: ErrorCode, message: &str) {
    response.success = false;
    response.error = Some(code);
    response.response_type = "error".to_string();
    response.message = message.to_string();
}

fn finalize(mut response: TurnResponse, channel: Channel, started: Instant) -> TurnResponse {
    if channel == Channel::Whatsapp {
        response.template = Some(template_for(&response));
    }
    response.duration_ms = started.elapsed().as_millis() as u64;
    response
}

/// Map a finished response onto the WhatsApp template catalog.
fn template_for(response: &TurnResponse) -> WhatsappTemplate {
    let group = response.group_name.clone().unwrap_or_default();
    let (name, parameters) = match response.response_type.as_str() {
        "welcome" => ("directory_welcome", vec![group]),
        "goodbye" | "session_ended" => ("directory_goodbye", vec![]),
        "menu" => ("directory_menu", vec![group]),
        "results" => (
            "directory_results",
            vec![response.results_count.to_string(), group],
        ),
        "members" => (
            "directory_members",
            vec![response.results_count.to_string(), group],
        ),
        "segments" => ("directory_segments", vec![group]),
        "contact" | "about" => (
            "directory_contact",
            vec![response
                .results
                .first()
                .map(|r| r.name.clone())
                .unwrap_or_default()],
        ),
        _ => ("directory_notice", vec![response.message.clone()]),
    };
    WhatsappTemplate {
        name: name.to_string(),
        parameters,
    }
}
