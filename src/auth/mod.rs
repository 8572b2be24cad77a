//! Authentication module for SecondBrain
//!
//! This module provides authentication-related functionality, including:
//! - The in-memory session and its subscribers
//! - Token storage and retrieval
//! - Identity providers (Google via Firebase, and a mock for development)

pub mod callback;
pub mod google;
pub mod mock;
pub mod provider;
pub mod session;
pub mod store;

pub use google::GoogleProvider;
pub use mock::MockProvider;
pub use provider::{IdentityProvider, SignIn, UnconfiguredProvider};
pub use session::{AuthSession, AuthState, Session};
pub use store::{FileStorage, MemoryStorage, Storage, TokenStore};
