//! Album operations. Media order within an album is the order of its `media` list.

use super::repository::{new_id, now, optional, required};
use super::Repository;
use crate::errors::AppError;
use crate::models::{Album, CreateAlbumRequest, MediaItem, NewMediaItem, UpdateAlbumRequest};

fn media_item(item: &NewMediaItem) -> Result<MediaItem, AppError> {
    Ok(MediaItem {
        id: new_id(),
        kind: item.kind,
        url: required(&item.url, "Media URL")?,
        caption: optional(item.caption.as_ref()),
    })
}

fn find_album<'a>(albums: &'a mut [Album], id: &str) -> Result<&'a mut Album, AppError> {
    albums
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Album {} not found", id)))
}

impl Repository {
    /// List albums, most recent date first. Undated albums sort last.
    pub async fn list_albums(&self) -> Result<Vec<Album>, AppError> {
        let mut albums = self.albums.load().await?;
        albums.sort_by(|a, b| {
            b.date
                .is_some()
                .cmp(&a.date.is_some())
                .then_with(|| b.date.cmp(&a.date))
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(albums)
    }

    pub async fn get_album(&self, id: &str) -> Result<Option<Album>, AppError> {
        let albums = self.albums.load().await?;
        Ok(albums.into_iter().find(|a| a.id == id))
    }

    pub async fn create_album(&self, request: &CreateAlbumRequest) -> Result<Album, AppError> {
        let media = request
            .media
            .iter()
            .map(media_item)
            .collect::<Result<Vec<_>, _>>()?;

        let now = now();
        let mut album = Album {
            id: new_id(),
            title: required(&request.title, "Title")?,
            description: optional(request.description.as_ref()),
            date: optional(request.date.as_ref()),
            cover_image: None,
            media,
            published: request.published,
            created_at: now.clone(),
            updated_at: now,
        };
        album.repair_cover();

        let mut albums = self.albums.lock().await?;
        albums.push(album.clone());
        albums.commit().await?;

        tracing::info!("Created album {} ({})", album.title, album.id);
        Ok(album)
    }

    pub async fn update_album(&self, id: &str, request: &UpdateAlbumRequest) -> Result<Album, AppError> {
        let mut albums = self.albums.lock().await?;
        let album = find_album(&mut albums, id)?;

        if let Some(title) = &request.title {
            album.title = required(title, "Title")?;
        }
        if request.description.is_some() {
            album.description = optional(request.description.as_ref());
        }
        if request.date.is_some() {
            album.date = optional(request.date.as_ref());
        }
        if let Some(published) = request.published {
            album.published = published;
        }
        album.updated_at = now();

        let updated = album.clone();
        albums.commit().await?;

        tracing::info!("Updated album {}", updated.id);
        Ok(updated)
    }

    pub async fn delete_album(&self, id: &str) -> Result<(), AppError> {
        let mut albums = self.albums.lock().await?;
        let before = albums.len();
        albums.retain(|a| a.id != id);
        if albums.len() == before {
            return Err(AppError::NotFound(format!("Album {} not found", id)));
        }
        albums.commit().await?;

        tracing::info!("Deleted album {}", id);
        Ok(())
    }

    /// Append media items to the end of an album.
    pub async fn add_media(&self, id: &str, items: &[NewMediaItem]) -> Result<Album, AppError> {
        if items.is_empty() {
            return Err(AppError::Validation("No media provided".to_string()));
        }
        let new_items = items.iter().map(media_item).collect::<Result<Vec<_>, _>>()?;

        let mut albums = self.albums.lock().await?;
        let album = find_album(&mut albums, id)?;
        album.media.extend(new_items);
        album.repair_cover();
        album.updated_at = now();

        let updated = album.clone();
        albums.commit().await?;

        tracing::info!("Added {} media item(s) to album {}", items.len(), id);
        Ok(updated)
    }

    /// Remove one media item. The cover moves to the first image if it pointed at the removed item.
    pub async fn remove_media(&self, id: &str, media_id: &str) -> Result<Album, AppError> {
        let mut albums = self.albums.lock().await?;
        let album = find_album(&mut albums, id)?;

        let before = album.media.len();
        album.media.retain(|m| m.id != media_id);
        if album.media.len() == before {
            return Err(AppError::NotFound(format!(
                "Media {} not found in album {}",
                media_id, id
            )));
        }
        album.repair_cover();
        album.updated_at = now();

        let updated = album.clone();
        albums.commit().await?;

        tracing::info!("Removed media {} from album {}", media_id, id);
        Ok(updated)
    }

    /// Reorder media. `media_ids` must be a permutation of the album's media ids.
    pub async fn reorder_media(&self, id: &str, media_ids: &[String]) -> Result<Album, AppError> {
        let mut albums = self.albums.lock().await?;
        let album = find_album(&mut albums, id)?;

        if media_ids.len() != album.media.len() {
            return Err(AppError::Validation(format!(
                "Expected {} media ids, got {}",
                album.media.len(),
                media_ids.len()
            )));
        }

        let mut remaining = std::mem::take(&mut album.media);
        let mut reordered = Vec::with_capacity(remaining.len());
        for media_id in media_ids {
            match remaining.iter().position(|m| &m.id == media_id) {
                Some(index) => reordered.push(remaining.swap_remove(index)),
                None => {
                    return Err(AppError::Validation(format!(
                        "Media {} is not part of album {} or listed twice",
                        media_id, id
                    )))
                }
            }
        }
        album.media = reordered;
        album.updated_at = now();

        let updated = album.clone();
        albums.commit().await?;

        tracing::info!("Reordered media in album {}", id);
        Ok(updated)
    }

    pub async fn set_cover(&self, id: &str, media_id: &str) -> Result<Album, AppError> {
        let mut albums = self.albums.lock().await?;
        let album = find_album(&mut albums, id)?;

        let url = album
            .media
            .iter()
            .find(|m| m.id == media_id)
            .map(|m| m.url.clone())
            .ok_or_else(|| {
                AppError::NotFound(format!("Media {} not found in album {}", media_id, id))
            })?;
        album.cover_image = Some(url);
        album.updated_at = now();

        let updated = album.clone();
        albums.commit().await?;

        tracing::info!("Set cover of album {} to media {}", id, media_id);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;
    use tempfile::TempDir;

    fn image(url: &str) -> NewMediaItem {
        NewMediaItem {
            kind: MediaKind::Image,
            url: url.to_string(),
            caption: None,
        }
    }

    async fn album_with(repo: &Repository, urls: &[&str]) -> Album {
        repo.create_album(&CreateAlbumRequest {
            title: "Spring run".to_string(),
            description: None,
            date: Some("2026-04-12".to_string()),
            published: true,
            media: urls.iter().map(|u| image(u)).collect(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_first_image_becomes_cover() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::new(dir.path(), 4);
        let album = album_with(&repo, &["/a.jpg", "/b.jpg"]).await;
        assert_eq!(album.cover_image.as_deref(), Some("/a.jpg"));
    }

    #[tokio::test]
    async fn test_reorder_media() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::new(dir.path(), 4);
        let album = album_with(&repo, &["/a.jpg", "/b.jpg", "/c.jpg"]).await;
        let ids: Vec<String> = album.media.iter().rev().map(|m| m.id.clone()).collect();

        let reordered = repo.reorder_media(&album.id, &ids).await.unwrap();
        let urls: Vec<&str> = reordered.media.iter().map(|m| m.url.as_str()).collect();
        assert_eq!(urls, vec!["/c.jpg", "/b.jpg", "/a.jpg"]);

        let duplicated = vec![ids[0].clone(), ids[0].clone(), ids[1].clone()];
        assert!(matches!(
            repo.reorder_media(&album.id, &duplicated).await,
            Err(AppError::Validation(_))
        ));
        // a failed reorder leaves the stored order untouched
        let stored = repo.get_album(&album.id).await.unwrap().unwrap();
        assert_eq!(stored.media[0].url, "/c.jpg");
    }

    #[tokio::test]
    async fn test_removing_cover_moves_it() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::new(dir.path(), 4);
        let album = album_with(&repo, &["/a.jpg", "/b.jpg"]).await;
        let second = album.media[1].id.clone();

        let album = repo.set_cover(&album.id, &second).await.unwrap();
        assert_eq!(album.cover_image.as_deref(), Some("/b.jpg"));

        let album = repo.remove_media(&album.id, &second).await.unwrap();
        assert_eq!(album.cover_image.as_deref(), Some("/a.jpg"));
        assert_eq!(album.media.len(), 1);
    }

    #[tokio::test]
    async fn test_add_media_appends() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::new(dir.path(), 4);
        let album = album_with(&repo, &[]).await;
        assert!(album.cover_image.is_none());

        let album = repo
            .add_media(&album.id, &[image("/x.jpg"), image("/y.jpg")])
            .await
            .unwrap();
        assert_eq!(album.media.len(), 2);
        assert_eq!(album.media[1].url, "/y.jpg");
        assert_eq!(album.cover_image.as_deref(), Some("/x.jpg"));
    }
}
