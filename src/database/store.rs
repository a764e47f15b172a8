use std::sync::Arc;

use async_trait::async_trait;

use super::manager::DatabaseError;
use super::models::{Comment, NewTicket, NewUser, Ticket, TicketChanges, User};
use crate::access::Role;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError>;

    /// Includes the password digest.
    async fn get_by_email(&self, email: &str) -> Result<User, DatabaseError>;

    async fn get_by_id(&self, id: i64) -> Result<User, DatabaseError>;

    async fn list(&self) -> Result<Vec<User>, DatabaseError>;

    async fn update_role(&self, id: i64, role: Role) -> Result<(), DatabaseError>;

    async fn delete(&self, id: i64) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn create(&self, ticket: NewTicket) -> Result<Ticket, DatabaseError>;

    async fn get_by_id(&self, id: i64) -> Result<Ticket, DatabaseError>;

    /// Newest first; `author` restricts the listing to one author's tickets.
    async fn list(&self, author: Option<i64>) -> Result<Vec<Ticket>, DatabaseError>;

    /// Writes every field of `changes` and returns the stored ticket.
    async fn update(&self, id: i64, changes: &TicketChanges) -> Result<Ticket, DatabaseError>;

    async fn delete(&self, id: i64) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create(&self, ticket_id: i64, user_id: i64, content: &str) -> Result<Comment, DatabaseError>;

    /// Oldest first.
    async fn list_by_ticket(&self, ticket_id: i64) -> Result<Vec<Comment>, DatabaseError>;

    async fn delete(&self, id: i64) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// The three stores handed to the request handlers.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub tickets: Arc<dyn TicketStore>,
    pub comments: Arc<dyn CommentStore>,
    pub health: Arc<dyn StoreHealth>,
}

impl Stores {
    /// Uses one backend for all three entities.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserStore + TicketStore + CommentStore + StoreHealth + 'static,
    {
        Self {
            users: backend.clone(),
            tickets: backend.clone(),
            comments: backend.clone(),
            health: backend,
        }
    }
}
