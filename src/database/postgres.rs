use async_trait::async_trait;
use sqlx::PgPool;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{Comment, NewTicket, NewUser, Ticket, TicketChanges, User};
use super::store::{CommentStore, StoreHealth, TicketStore, UserStore};
use crate::access::{lifecycle, Role};

const TICKET_COLUMNS: &str = r#"
    t.id, t.title, t.description, t.status, t.priority,
    t.author_id, u.username AS author_name,
    t.assigned_to, a.username AS assignee_name,
    t.created_at, t.updated_at
"#;

const TICKET_JOINS: &str = r#"
    FROM tickets t
    JOIN users u ON u.id = t.author_id
    LEFT JOIN users a ON a.id = t.assigned_to
"#;

/// Postgres-backed implementation of every store trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn not_found(kind: &str, id: i64) -> DatabaseError {
        DatabaseError::NotFound(format!("{} {} not found", kind, id))
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let query = r#"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, role, created_at
        "#;

        let created = sqlx::query_as::<_, User>(query)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn get_by_email(&self, email: &str) -> Result<User, DatabaseError> {
        let query = r#"
            SELECT id, username, email, password_hash, role, created_at
            FROM users
            WHERE email = $1
        "#;

        sqlx::query_as::<_, User>(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {} not found", email)))
    }

    async fn get_by_id(&self, id: i64) -> Result<User, DatabaseError> {
        let query = "SELECT id, username, email, role, created_at FROM users WHERE id = $1";

        sqlx::query_as::<_, User>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found("user", id))
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        let query = "SELECT id, username, email, role, created_at FROM users ORDER BY id";
        Ok(sqlx::query_as::<_, User>(query).fetch_all(&self.pool).await?)
    }

    async fn update_role(&self, id: i64, role: Role) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TicketStore for PgStore {
    async fn create(&self, ticket: NewTicket) -> Result<Ticket, DatabaseError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO tickets (title, description, status, priority, author_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(lifecycle::INITIAL_STATUS.as_str())
        .bind(ticket.priority.as_str())
        .bind(ticket.author_id)
        .fetch_one(&self.pool)
        .await?;

        TicketStore::get_by_id(self, id).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Ticket, DatabaseError> {
        let query = format!("SELECT {} {} WHERE t.id = $1", TICKET_COLUMNS, TICKET_JOINS);

        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found("ticket", id))
    }

    async fn list(&self, author: Option<i64>) -> Result<Vec<Ticket>, DatabaseError> {
        let query = format!(
            "SELECT {} {} WHERE ($1::BIGINT IS NULL OR t.author_id = $1) ORDER BY t.created_at DESC, t.id DESC",
            TICKET_COLUMNS, TICKET_JOINS
        );

        Ok(sqlx::query_as::<_, Ticket>(&query)
            .bind(author)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update(&self, id: i64, changes: &TicketChanges) -> Result<Ticket, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET title = $1, description = $2, priority = $3, status = $4,
                assigned_to = $5, updated_at = NOW()
            WHERE id = $6
            "#,
        )
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.priority.as_str())
        .bind(changes.status.as_str())
        .bind(changes.assigned_to)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found("ticket", id));
        }
        TicketStore::get_by_id(self, id).await
    }

    async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found("ticket", id));
        }
        Ok(())
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn create(&self, ticket_id: i64, user_id: i64, content: &str) -> Result<Comment, DatabaseError> {
        let query = r#"
            WITH inserted AS (
                INSERT INTO comments (ticket_id, user_id, content)
                VALUES ($1, $2, $3)
                RETURNING id, ticket_id, user_id, content, created_at
            )
            SELECT c.id, c.ticket_id, c.user_id, u.username, c.content, c.created_at
            FROM inserted c
            JOIN users u ON u.id = c.user_id
        "#;

        Ok(sqlx::query_as::<_, Comment>(query)
            .bind(ticket_id)
            .bind(user_id)
            .bind(content)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_by_ticket(&self, ticket_id: i64) -> Result<Vec<Comment>, DatabaseError> {
        let query = r#"
            SELECT c.id, c.ticket_id, c.user_id, u.username, c.content, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.ticket_id = $1
            ORDER BY c.created_at ASC, c.id ASC
        "#;

        Ok(sqlx::query_as::<_, Comment>(query)
            .bind(ticket_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found("comment", id));
        }
        Ok(())
    }
}
