//! In-process store with the same observable behaviour as the Postgres one.
//!
//! Backs the router tests and `serve --in-memory`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::{Comment, NewTicket, NewUser, Ticket, TicketChanges, TicketPriority, TicketStatus, User};
use super::store::{CommentStore, StoreHealth, TicketStore, UserStore};
use crate::access::{lifecycle, Role};

#[derive(Debug, Clone)]
struct TicketRow {
    id: i64,
    title: String,
    description: String,
    status: TicketStatus,
    priority: TicketPriority,
    author_id: i64,
    assigned_to: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct CommentRow {
    id: i64,
    ticket_id: i64,
    user_id: i64,
    content: String,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    tickets: BTreeMap<i64, TicketRow>,
    comments: BTreeMap<i64, CommentRow>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn username(&self, id: i64) -> Option<String> {
        self.users.get(&id).map(|u| u.username.clone())
    }

    fn ticket(&self, row: &TicketRow) -> Ticket {
        Ticket {
            id: row.id,
            title: row.title.clone(),
            description: row.description.clone(),
            status: row.status,
            priority: row.priority,
            author_id: row.author_id,
            author_name: self.username(row.author_id).unwrap_or_default(),
            assigned_to: row.assigned_to,
            assignee_name: row.assigned_to.and_then(|id| self.username(id)),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    fn comment(&self, row: &CommentRow) -> Comment {
        Comment {
            id: row.id,
            ticket_id: row.ticket_id,
            user_id: row.user_id,
            username: self.username(row.user_id).unwrap_or_default(),
            content: row.content.clone(),
            created_at: row.created_at,
        }
    }

    fn require_user(&self, id: i64) -> Result<(), DatabaseError> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(DatabaseError::QueryError(format!("user {} does not exist", id)))
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(kind: &str, id: i64) -> DatabaseError {
        DatabaseError::NotFound(format!("{} {} not found", kind, id))
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(DatabaseError::QueryError("duplicate email".to_string()));
        }

        let id = tables.next_id();
        let created = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.insert(id, created.clone());
        Ok(created)
    }

    async fn get_by_email(&self, email: &str) -> Result<User, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("user {} not found", email)))
    }

    async fn get_by_id(&self, id: i64) -> Result<User, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .users
            .get(&id)
            .map(|u| User { password_hash: String::new(), ..u.clone() })
            .ok_or_else(|| Self::not_found("user", id))
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .map(|u| User { password_hash: String::new(), ..u.clone() })
            .collect())
    }

    async fn update_role(&self, id: i64, role: Role) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.get_mut(&id) {
            user.role = role;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(());
        }

        tables.tickets.retain(|_, t| t.author_id != id);
        for ticket in tables.tickets.values_mut() {
            if ticket.assigned_to == Some(id) {
                ticket.assigned_to = None;
            }
        }
        let Tables { tickets, comments, .. } = &mut *tables;
        comments.retain(|_, c| c.user_id != id && tickets.contains_key(&c.ticket_id));
        Ok(())
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn create(&self, ticket: NewTicket) -> Result<Ticket, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.require_user(ticket.author_id)?;

        let id = tables.next_id();
        let now = Utc::now();
        let row = TicketRow {
            id,
            title: ticket.title,
            description: ticket.description,
            status: lifecycle::INITIAL_STATUS,
            priority: ticket.priority,
            author_id: ticket.author_id,
            assigned_to: None,
            created_at: now,
            updated_at: now,
        };
        let created = tables.ticket(&row);
        tables.tickets.insert(id, row);
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Ticket, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .tickets
            .get(&id)
            .map(|row| tables.ticket(row))
            .ok_or_else(|| Self::not_found("ticket", id))
    }

    async fn list(&self, author: Option<i64>) -> Result<Vec<Ticket>, DatabaseError> {
        let tables = self.tables.read().await;
        // ids grow with creation time, so reverse id order is newest first
        Ok(tables
            .tickets
            .values()
            .rev()
            .filter(|row| author.map_or(true, |a| row.author_id == a))
            .map(|row| tables.ticket(row))
            .collect())
    }

    async fn update(&self, id: i64, changes: &TicketChanges) -> Result<Ticket, DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(assignee) = changes.assigned_to {
            tables.require_user(assignee)?;
        }

        let row = tables
            .tickets
            .get_mut(&id)
            .ok_or_else(|| Self::not_found("ticket", id))?;
        row.title = changes.title.clone();
        row.description = changes.description.clone();
        row.priority = changes.priority;
        row.status = changes.status;
        row.assigned_to = changes.assigned_to;
        row.updated_at = Utc::now();

        let row = row.clone();
        Ok(tables.ticket(&row))
    }

    async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.tickets.remove(&id).is_none() {
            return Err(Self::not_found("ticket", id));
        }
        tables.comments.retain(|_, c| c.ticket_id != id);
        Ok(())
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn create(&self, ticket_id: i64, user_id: i64, content: &str) -> Result<Comment, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.require_user(user_id)?;
        if !tables.tickets.contains_key(&ticket_id) {
            return Err(DatabaseError::QueryError(format!("ticket {} does not exist", ticket_id)));
        }

        let id = tables.next_id();
        let row = CommentRow {
            id,
            ticket_id,
            user_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        let created = tables.comment(&row);
        tables.comments.insert(id, row);
        Ok(created)
    }

    async fn list_by_ticket(&self, ticket_id: i64) -> Result<Vec<Comment>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.ticket_id == ticket_id)
            .map(|c| tables.comment(c))
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        tables
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found("comment", id))
    }
}
