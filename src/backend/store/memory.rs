/**
 * In-Memory Store
 *
 * Implements every store trait over plain vectors behind one
 * `tokio::sync::RwLock`. Insertion order doubles as creation order, so
 * list ordering matches the PostgreSQL queries without comparing
 * timestamps. Nothing survives a restart.
 */

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::store::{
    Comment, CommentStore, NewComment, NewPhoto, NewTransform, NewUser, Photo, PhotoFilter,
    PhotoStore, StoreError, Transform, TransformStore, User, UserStore,
};
use crate::shared::photo::MAX_TAGS_PER_PHOTO;
use crate::shared::{Page, Role, TransformParams};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    photos: Vec<Photo>,
    comments: Vec<Comment>,
    transforms: Vec<Transform>,
}

/// Process-local store; clones share the same data
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T>(items: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    items
        .skip(page.offset.max(0) as usize)
        .take(page.limit.max(0) as usize)
        .collect()
}

fn user_mut(tables: &mut Tables, id: Uuid) -> Result<&mut User, StoreError> {
    tables
        .users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or(StoreError::NotFound { entity: "user" })
}

fn photo_mut(tables: &mut Tables, id: Uuid) -> Result<&mut Photo, StoreError> {
    tables
        .photos
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or(StoreError::NotFound { entity: "photo" })
}

fn insert_user(tables: &mut Tables, new_user: NewUser) -> Result<User, StoreError> {
    if tables.users.iter().any(|u| u.email == new_user.email) {
        return Err(StoreError::Conflict("Email already registered".to_string()));
    }
    if tables.users.iter().any(|u| u.username == new_user.username) {
        return Err(StoreError::Conflict("Username already taken".to_string()));
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        username: new_user.username,
        email: new_user.email,
        password_hash: new_user.password_hash,
        role: new_user.role,
        confirmed: false,
        avatar_url: new_user.avatar_url,
        refresh_token: None,
        created_at: now,
        updated_at: now,
    };
    tables.users.push(user.clone());
    Ok(user)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        insert_user(&mut tables, new_user)
    }

    async fn register_user(&self, mut new_user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.is_empty() {
            new_user.role = Role::Admin;
        }
        insert_user(&mut tables, new_user)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn confirm_email(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let user = user_mut(&mut tables, id)?;
        if user.confirmed {
            return Ok(false);
        }
        user.confirmed = true;
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let user = user_mut(&mut tables, id)?;
        user.refresh_token = token.map(str::to_owned);
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let user = user_mut(&mut tables, id)?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn set_avatar(&self, id: Uuid, avatar_url: &str) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        let user = user_mut(&mut tables, id)?;
        user.avatar_url = Some(avatar_url.to_string());
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        let user = user_mut(&mut tables, id)?;
        user.role = role;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl PhotoStore for MemoryStore {
    async fn create_photo(&self, new_photo: NewPhoto) -> Result<Photo, StoreError> {
        let mut tags: Vec<String> = Vec::new();
        for tag in new_photo.tags {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        if tags.len() > MAX_TAGS_PER_PHOTO {
            return Err(StoreError::TagLimitExceeded { limit: MAX_TAGS_PER_PHOTO });
        }
        tags.sort();

        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == new_photo.user_id) {
            return Err(StoreError::NotFound { entity: "user" });
        }
        let now = Utc::now();
        let photo = Photo {
            id: Uuid::new_v4(),
            user_id: new_photo.user_id,
            url: new_photo.url,
            public_id: new_photo.public_id,
            description: new_photo.description,
            tags,
            created_at: now,
            updated_at: now,
        };
        tables.photos.push(photo.clone());
        Ok(photo)
    }

    async fn photo_by_id(&self, id: Uuid) -> Result<Option<Photo>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.photos.iter().find(|p| p.id == id).cloned())
    }

    async fn list_photos(&self, filter: &PhotoFilter, page: Page) -> Result<Vec<Photo>, StoreError> {
        let tables = self.tables.read().await;
        let matching = tables
            .photos
            .iter()
            .rev()
            .filter(|p| filter.owner.map_or(true, |owner| p.user_id == owner))
            .filter(|p| filter.tag.as_ref().map_or(true, |tag| p.tags.contains(tag)))
            .cloned();
        Ok(paginate(matching, page))
    }

    async fn count_photos_by_owner(&self, owner: Uuid) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.photos.iter().filter(|p| p.user_id == owner).count() as i64)
    }

    async fn update_description(&self, id: Uuid, description: Option<String>) -> Result<Photo, StoreError> {
        let mut tables = self.tables.write().await;
        let photo = photo_mut(&mut tables, id)?;
        photo.description = description;
        photo.updated_at = Utc::now();
        Ok(photo.clone())
    }

    async fn delete_photo(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.photos.len();
        tables.photos.retain(|p| p.id != id);
        if tables.photos.len() == before {
            return Err(StoreError::NotFound { entity: "photo" });
        }
        tables.comments.retain(|c| c.photo_id != id);
        tables.transforms.retain(|t| t.photo_id != id);
        Ok(())
    }

    async fn attach_tag(&self, photo_id: Uuid, tag: &str) -> Result<Photo, StoreError> {
        let mut tables = self.tables.write().await;
        let photo = photo_mut(&mut tables, photo_id)?;
        if photo.tags.iter().any(|t| t == tag) {
            return Ok(photo.clone());
        }
        if photo.tags.len() >= MAX_TAGS_PER_PHOTO {
            return Err(StoreError::TagLimitExceeded { limit: MAX_TAGS_PER_PHOTO });
        }
        photo.tags.push(tag.to_string());
        photo.tags.sort();
        photo.updated_at = Utc::now();
        Ok(photo.clone())
    }

    async fn detach_tag(&self, photo_id: Uuid, tag: &str) -> Result<Photo, StoreError> {
        let mut tables = self.tables.write().await;
        let photo = photo_mut(&mut tables, photo_id)?;
        let before = photo.tags.len();
        photo.tags.retain(|t| t != tag);
        if photo.tags.len() == before {
            return Err(StoreError::NotFound { entity: "tag" });
        }
        photo.updated_at = Utc::now();
        Ok(photo.clone())
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn create_comment(&self, new_comment: NewComment) -> Result<Comment, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.photos.iter().any(|p| p.id == new_comment.photo_id) {
            return Err(StoreError::NotFound { entity: "photo" });
        }
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            photo_id: new_comment.photo_id,
            user_id: new_comment.user_id,
            text: new_comment.text,
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn comment_by_id(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments(&self, photo_id: Uuid, page: Page) -> Result<Vec<Comment>, StoreError> {
        let tables = self.tables.read().await;
        let matching = tables
            .comments
            .iter()
            .filter(|c| c.photo_id == photo_id)
            .cloned();
        Ok(paginate(matching, page))
    }

    async fn update_comment(&self, id: Uuid, text: &str) -> Result<Comment, StoreError> {
        let mut tables = self.tables.write().await;
        let comment = tables
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound { entity: "comment" })?;
        comment.text = text.to_string();
        comment.updated_at = Utc::now();
        Ok(comment.clone())
    }

    async fn delete_comment(&self, id: Uuid) -> Result<Comment, StoreError> {
        let mut tables = self.tables.write().await;
        let index = tables
            .comments
            .iter()
            .position(|c| c.id == id)
            .ok_or(StoreError::NotFound { entity: "comment" })?;
        Ok(tables.comments.remove(index))
    }
}

#[async_trait]
impl TransformStore for MemoryStore {
    async fn create_transform(&self, new_transform: NewTransform) -> Result<Transform, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.photos.iter().any(|p| p.id == new_transform.photo_id) {
            return Err(StoreError::NotFound { entity: "photo" });
        }
        let now = Utc::now();
        let transform = Transform {
            id: Uuid::new_v4(),
            photo_id: new_transform.photo_id,
            user_id: new_transform.user_id,
            url: new_transform.url,
            params: new_transform.params,
            created_at: now,
            updated_at: now,
        };
        tables.transforms.push(transform.clone());
        Ok(transform)
    }

    async fn transform_by_id(&self, id: Uuid) -> Result<Option<Transform>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.transforms.iter().find(|t| t.id == id).cloned())
    }

    async fn list_transforms_by_user(&self, user_id: Uuid) -> Result<Vec<Transform>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .transforms
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_transform(&self, id: Uuid, url: &str, params: TransformParams) -> Result<Transform, StoreError> {
        let mut tables = self.tables.write().await;
        let transform = tables
            .transforms
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound { entity: "transform" })?;
        transform.url = url.to_string();
        transform.params = params;
        transform.updated_at = Utc::now();
        Ok(transform.clone())
    }

    async fn delete_transform(&self, id: Uuid) -> Result<Transform, StoreError> {
        let mut tables = self.tables.write().await;
        let index = tables
            .transforms
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound { entity: "transform" })?;
        Ok(tables.transforms.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            password_hash: "hash".to_string(),
            role: Role::Regular,
            avatar_url: None,
        }
    }

    async fn seeded_photo(store: &MemoryStore, tags: &[&str]) -> Photo {
        let owner = store.create_user(new_user("owner")).await.unwrap();
        store
            .create_photo(NewPhoto {
                user_id: owner.id,
                url: "https://img.example/1.jpg".to_string(),
                public_id: "p1".to_string(),
                description: None,
                tags: tags.iter().map(|t| t.to_string()).collect(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user("alice")).await.unwrap();

        let mut dup = new_user("alice2");
        dup.email = "alice@example.com".to_string();
        assert_matches!(store.create_user(dup).await, Err(StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_concurrent_registrations_promote_one_admin() {
        let store = MemoryStore::new();
        let (a, b, c) = tokio::join!(
            store.register_user(new_user("a")),
            store.register_user(new_user("b")),
            store.register_user(new_user("c")),
        );

        let roles = [a.unwrap().role, b.unwrap().role, c.unwrap().role];
        assert_eq!(roles.iter().filter(|r| **r == Role::Admin).count(), 1);

        let later = store.register_user(new_user("d")).await.unwrap();
        assert_eq!(later.role, Role::Regular);
    }

    #[tokio::test]
    async fn test_confirm_email_reports_change() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("bob")).await.unwrap();
        assert!(!user.confirmed);

        assert!(store.confirm_email(user.id).await.unwrap());
        assert!(!store.confirm_email(user.id).await.unwrap());
        assert!(store.user_by_id(user.id).await.unwrap().unwrap().confirmed);
    }

    #[tokio::test]
    async fn test_attach_tag_enforces_limit() {
        let store = MemoryStore::new();
        let photo = seeded_photo(&store, &["a", "b", "c", "d"]).await;

        let photo = store.attach_tag(photo.id, "e").await.unwrap();
        assert_eq!(photo.tags.len(), 5);

        // re-attaching is a no-op, even at the limit
        let photo = store.attach_tag(photo.id, "a").await.unwrap();
        assert_eq!(photo.tags.len(), 5);

        assert_matches!(
            store.attach_tag(photo.id, "f").await,
            Err(StoreError::TagLimitExceeded { limit: 5 })
        );
    }

    #[tokio::test]
    async fn test_detach_missing_tag() {
        let store = MemoryStore::new();
        let photo = seeded_photo(&store, &["a"]).await;
        assert_matches!(
            store.detach_tag(photo.id, "zzz").await,
            Err(StoreError::NotFound { entity: "tag" })
        );
        let photo = store.detach_tag(photo.id, "a").await.unwrap();
        assert!(photo.tags.is_empty());
    }

    #[tokio::test]
    async fn test_delete_photo_cascades() {
        let store = MemoryStore::new();
        let photo = seeded_photo(&store, &[]).await;
        let comment = store
            .create_comment(NewComment {
                photo_id: photo.id,
                user_id: photo.user_id,
                text: "hi".to_string(),
            })
            .await
            .unwrap();

        store.delete_photo(photo.id).await.unwrap();
        assert!(store.comment_by_id(comment.id).await.unwrap().is_none());
        assert_matches!(
            store.delete_photo(photo.id).await,
            Err(StoreError::NotFound { entity: "photo" })
        );
    }

    #[tokio::test]
    async fn test_list_photos_filters_and_pages() {
        let store = MemoryStore::new();
        let owner = store.create_user(new_user("carol")).await.unwrap();
        for i in 0..3 {
            store
                .create_photo(NewPhoto {
                    user_id: owner.id,
                    url: format!("https://img.example/{}.jpg", i),
                    public_id: format!("p{}", i),
                    description: None,
                    tags: if i == 1 { vec!["sea".to_string()] } else { vec![] },
                })
                .await
                .unwrap();
        }

        let all = store
            .list_photos(&PhotoFilter::default(), Page { offset: 0, limit: 10 })
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].public_id, "p2");

        let tagged = store
            .list_photos(
                &PhotoFilter { owner: None, tag: Some("sea".to_string()) },
                Page { offset: 0, limit: 10 },
            )
            .await
            .unwrap();
        assert_eq!(tagged.len(), 1);

        let second_page = store
            .list_photos(&PhotoFilter::default(), Page { offset: 2, limit: 2 })
            .await
            .unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].public_id, "p0");
    }
}
