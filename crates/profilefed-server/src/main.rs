//! ProfileFed demo server binary
//!
//! Serves WebFinger, server-info, and profile endpoints for a small
//! in-memory set of demo profiles.

use async_trait::async_trait;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use profilefed_core::{Descriptor, Link, Role, WebFingerDescriptor, PFD_MEDIA_TYPE};
use profilefed_server::{
    create_router, load_or_generate_keys, load_private_keys, DescriptorProvider, HandlerError,
    ProfileHandler, ProfileQuery, ResourceResolver, ServerInfoHandler, WebFingerHandler,
    PROFILE_PATH,
};

/// In-memory profile directory backing both the WebFinger resolver and the
/// descriptor provider
struct DemoDirectory {
    server_name: String,
    profiles: Vec<Descriptor>,
}

impl DemoDirectory {
    fn new(server_name: String) -> Self {
        let mut alice = Descriptor {
            id: "1".into(),
            display_name: "Alice".into(),
            username: "alice".into(),
            bio: "Demo profile".into(),
            role: Role::server_host(),
            ..Descriptor::default()
        };
        alice
            .add_extra(
                "https://profilefed.org/ns/demo#website",
                "website",
                &"https://example.com",
            )
            .expect("static extra data serializes");

        let bob = Descriptor {
            id: "2".into(),
            display_name: "Bob".into(),
            username: "bob".into(),
            role: Role::user(),
            ..Descriptor::default()
        };

        Self {
            server_name,
            profiles: vec![alice, bob],
        }
    }

    fn by_username(&self, username: &str) -> Option<&Descriptor> {
        self.profiles.iter().find(|p| p.username == username)
    }
}

#[async_trait]
impl ResourceResolver for DemoDirectory {
    async fn resolve(&self, resource: &str) -> Result<WebFingerDescriptor, HandlerError> {
        let acct = resource.strip_prefix("acct:").unwrap_or(resource);
        let username = acct.rsplit_once('@').map_or(acct, |(user, _)| user);

        let profile = self
            .by_username(username)
            .ok_or_else(|| HandlerError::Resolver(format!("unknown resource: {resource}")))?;

        Ok(WebFingerDescriptor {
            subject: resource.to_string(),
            aliases: vec![],
            properties: HashMap::new(),
            links: vec![Link {
                rel: "self".into(),
                link_type: Some(PFD_MEDIA_TYPE.into()),
                href: format!(
                    "http://{}{}?id={}",
                    self.server_name, PROFILE_PATH, profile.id
                ),
            }],
        })
    }
}

#[async_trait]
impl DescriptorProvider for DemoDirectory {
    async fn descriptor(&self, query: &ProfileQuery) -> Result<Descriptor, HandlerError> {
        match query.id.as_deref() {
            Some(id) => self
                .profiles
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or(HandlerError::DescriptorNotFound),
            None => self
                .profiles
                .first()
                .cloned()
                .ok_or(HandlerError::DescriptorNotFound),
        }
    }

    async fn all_descriptors(
        &self,
        _query: &ProfileQuery,
    ) -> Result<HashMap<String, Descriptor>, HandlerError> {
        Ok(self
            .profiles
            .iter()
            .map(|p| (p.id.clone(), p.clone()))
            .collect())
    }
}

fn env_list(name: &str) -> Vec<String> {
    env::var(name)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::main]
async fn main() {
    // Initialize logging
    let log_level = env::var("PROFILEFED_LOG_LEVEL")
        .unwrap_or_else(|_| "info".into())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // Configuration
    let port: u16 = env::var("PROFILEFED_PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()
        .expect("PROFILEFED_PORT must be a valid port number");

    let server_name =
        env::var("PROFILEFED_SERVER_NAME").unwrap_or_else(|_| format!("127.0.0.1:{port}"));

    let key_path = env::var("PROFILEFED_KEY_PATH").unwrap_or_else(|_| "profilefed.key".into());
    let signing_key = load_or_generate_keys(&key_path).expect("Failed to load signing key");

    let previous_names = env_list("PROFILEFED_PREVIOUS_NAMES");
    let previous_keys = load_private_keys(env_list("PROFILEFED_PREVIOUS_KEY_PATHS"));

    info!(
        server_name = %server_name,
        port = port,
        previous_names = ?previous_names,
        previous_keys = previous_keys.len(),
        "Starting ProfileFed server"
    );

    let directory = Arc::new(DemoDirectory::new(server_name.clone()));

    let webfinger = Arc::new(WebFingerHandler::new(directory.clone()));
    let server_info = Arc::new(
        ServerInfoHandler::new(server_name, signing_key.clone())
            .with_previous_names(previous_names)
            .with_previous_keys(previous_keys),
    );
    let profile = Arc::new(ProfileHandler::new(signing_key, directory));

    let app = create_router(webfinger, server_info, profile);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!(addr = %addr, "ProfileFed server listening");

    axum::serve(listener, app).await.expect("Server error");
}
