/// Full-screen viewer navigation
///
/// The viewer is either closed or showing exactly one photo. Neighbours are
/// looked up by position in the list passed to each call, never from a
/// cached index, so the list may change between calls.

use tracing::debug;

use crate::error::DeleteError;
use crate::state::data::{PhotoId, ResolvedPhoto};
use crate::state::store::MediaStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Closed,
    Open(PhotoId),
}

/// Keys the viewer reacts to while open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Escape,
    Left,
    Right,
}

#[derive(Debug, Default)]
pub struct Lightbox {
    selection: Selection,
}

fn position(photos: &[ResolvedPhoto], id: PhotoId) -> Option<usize> {
    photos.iter().position(|photo| photo.id() == id)
}

impl Lightbox {
    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn is_open(&self) -> bool {
        matches!(self.selection, Selection::Open(_))
    }

    /// The photo on screen, if it is still in the list
    pub fn current<'a>(&self, photos: &'a [ResolvedPhoto]) -> Option<&'a ResolvedPhoto> {
        match self.selection {
            Selection::Open(id) => position(photos, id).map(|index| &photos[index]),
            Selection::Closed => None,
        }
    }

    /// Open the viewer on a photo. Photos without a resolved URL can't be viewed.
    pub fn select(&mut self, photos: &[ResolvedPhoto], id: PhotoId) {
        match position(photos, id) {
            Some(index) if photos[index].is_viewable() => {
                self.selection = Selection::Open(id);
            }
            Some(_) => debug!(?id, "photo not resolved yet, viewer stays put"),
            None => debug!(?id, "selected photo is no longer listed"),
        }
    }

    pub fn close(&mut self) {
        self.selection = Selection::Closed;
    }

    pub fn previous(&mut self, photos: &[ResolvedPhoto]) {
        self.step(photos, |index, len| if index == 0 { len - 1 } else { index - 1 });
    }

    pub fn next(&mut self, photos: &[ResolvedPhoto]) {
        self.step(photos, |index, len| (index + 1) % len);
    }

    fn step(&mut self, photos: &[ResolvedPhoto], advance: impl Fn(usize, usize) -> usize) {
        let Selection::Open(id) = self.selection else {
            return;
        };
        if photos.is_empty() {
            return;
        }

        match position(photos, id) {
            Some(index) => {
                let target = advance(index, photos.len());
                self.selection = Selection::Open(photos[target].id());
            }
            None => self.close(),
        }
    }

    /// Close the viewer and hand back the photo that should be deleted
    pub fn take_for_delete(&mut self) -> Option<PhotoId> {
        match std::mem::take(&mut self.selection) {
            Selection::Open(id) => Some(id),
            Selection::Closed => None,
        }
    }

    /// Close the viewer if its photo disappeared from the list
    pub fn reconcile(&mut self, photos: &[ResolvedPhoto]) {
        if let Selection::Open(id) = self.selection {
            if position(photos, id).is_none() {
                debug!(?id, "viewed photo was removed, closing viewer");
                self.close();
            }
        }
    }

    pub fn handle_key(&mut self, key: NavKey, photos: &[ResolvedPhoto]) {
        if !self.is_open() {
            return;
        }
        match key {
            NavKey::Escape => self.close(),
            NavKey::Left => self.previous(photos),
            NavKey::Right => self.next(photos),
        }
    }
}

/// Previous/next controls only make sense with two or more photos
pub fn shows_navigation(photo_count: usize) -> bool {
    photo_count >= 2
}

/// Delete the photo handed out by `take_for_delete`
pub async fn remove_photo<S>(store: &S, id: PhotoId) -> Result<PhotoId, DeleteError>
where
    S: MediaStore + ?Sized,
{
    store
        .delete_photo(id)
        .await
        .map(|()| id)
        .map_err(|source| DeleteError { id, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::gallery::projection::{fetch_snapshot, Projection};
    use crate::state::data::{Photo, StorageRef};
    use crate::state::fake_store::{FailurePlan, FakeStore};

    fn photos(count: i64) -> Vec<ResolvedPhoto> {
        (1..=count)
            .map(|id| ResolvedPhoto {
                photo: Photo {
                    id: PhotoId(id),
                    storage: StorageRef(format!("s{}", id)),
                    caption: None,
                    created_at: 100 - id,
                },
                url: Some(format!("mem://s{}", id)),
                thumbnail: None,
            })
            .collect()
    }

    fn opened_on(list: &[ResolvedPhoto], index: usize) -> Lightbox {
        let mut lightbox = Lightbox::default();
        lightbox.select(list, list[index].id());
        lightbox
    }

    #[test]
    fn test_next_wraps_around() {
        let list = photos(3);
        let mut lightbox = opened_on(&list, 0);

        lightbox.next(&list);
        assert_eq!(lightbox.selection(), Selection::Open(PhotoId(2)));
        lightbox.next(&list);
        lightbox.next(&list);
        assert_eq!(lightbox.selection(), Selection::Open(PhotoId(1)));
    }

    #[test]
    fn test_previous_wraps_to_last() {
        let list = photos(3);
        let mut lightbox = opened_on(&list, 0);

        lightbox.previous(&list);
        assert_eq!(lightbox.selection(), Selection::Open(PhotoId(3)));
    }

    #[test]
    fn test_two_n_steps_return_to_start() {
        for count in 1..=5 {
            let list = photos(count);
            let mut lightbox = opened_on(&list, 0);
            for _ in 0..count {
                lightbox.next(&list);
                lightbox.previous(&list);
            }
            for _ in 0..count {
                lightbox.previous(&list);
            }
            for _ in 0..count {
                lightbox.next(&list);
            }
            assert_eq!(lightbox.selection(), Selection::Open(PhotoId(1)));
        }
    }

    #[test]
    fn test_selecting_unresolved_photo_stays_closed() {
        let mut list = photos(2);
        list[1].url = None;
        let mut lightbox = Lightbox::default();

        lightbox.select(&list, PhotoId(2));
        assert_eq!(lightbox.selection(), Selection::Closed);
    }

    #[test]
    fn test_selecting_unresolved_photo_keeps_current() {
        let mut list = photos(2);
        list[1].url = None;
        let mut lightbox = opened_on(&list, 0);

        lightbox.select(&list, PhotoId(2));
        assert_eq!(lightbox.selection(), Selection::Open(PhotoId(1)));
    }

    #[test]
    fn test_navigation_controls_need_two_photos() {
        assert!(!shows_navigation(0));
        assert!(!shows_navigation(1));
        assert!(shows_navigation(2));
        assert!(shows_navigation(10));
    }

    #[test]
    fn test_delete_closes_for_any_list_size() {
        for count in 1..=4 {
            let list = photos(count);
            let mut lightbox = opened_on(&list, (count - 1) as usize);

            let doomed = lightbox.take_for_delete();
            assert_eq!(doomed, Some(PhotoId(count)));
            assert_eq!(lightbox.selection(), Selection::Closed);
        }
        assert_eq!(Lightbox::default().take_for_delete(), None);
    }

    #[test]
    fn test_keys_only_act_while_open() {
        let list = photos(3);
        let mut lightbox = Lightbox::default();
        lightbox.handle_key(NavKey::Right, &list);
        assert_eq!(lightbox.selection(), Selection::Closed);

        lightbox.select(&list, PhotoId(1));
        lightbox.handle_key(NavKey::Left, &list);
        assert_eq!(lightbox.selection(), Selection::Open(PhotoId(3)));
        lightbox.handle_key(NavKey::Right, &list);
        assert_eq!(lightbox.selection(), Selection::Open(PhotoId(1)));
        lightbox.handle_key(NavKey::Escape, &list);
        assert_eq!(lightbox.selection(), Selection::Closed);
    }

    #[test]
    fn test_navigation_uses_current_list() {
        let list = photos(3);
        let mut lightbox = opened_on(&list, 1);

        // photo 1 vanished and photo 4 arrived between renders
        let mut changed = photos(4);
        changed.remove(0);
        lightbox.next(&changed);
        assert_eq!(lightbox.selection(), Selection::Open(PhotoId(3)));
    }

    #[test]
    fn test_empty_list_navigation_is_noop() {
        let list = photos(1);
        let mut lightbox = opened_on(&list, 0);
        lightbox.next(&[]);
        assert_eq!(lightbox.selection(), Selection::Open(PhotoId(1)));
    }

    #[test]
    fn test_reconcile_closes_when_photo_removed() {
        let list = photos(3);
        let mut lightbox = opened_on(&list, 2);

        lightbox.reconcile(&list);
        assert!(lightbox.is_open());

        lightbox.reconcile(&list[..2]);
        assert_eq!(lightbox.selection(), Selection::Closed);
        assert!(lightbox.current(&list).is_none());
    }

    async fn projected(store: &FakeStore, projection: &mut Projection) {
        let snapshot = fetch_snapshot(store, projection.revision()).await.unwrap();
        if let Some(snapshot) = snapshot {
            projection.apply(snapshot);
        }
    }

    #[tokio::test]
    async fn test_failed_delete_reports_and_stays_closed() {
        let store = FakeStore::with_plan(FailurePlan {
            delete_fails: true,
            ..Default::default()
        });
        let id = store.seed("a", 1);
        let mut projection = Projection::default();
        projected(&store, &mut projection).await;

        let mut lightbox = Lightbox::default();
        lightbox.select(projection.photos(), id);
        let doomed = lightbox.take_for_delete().unwrap();

        let err = remove_photo(&store, doomed).await.unwrap_err();
        assert_eq!(err.id, id);
        assert!(matches!(err.source, StoreError::Unavailable(_)));
        assert_eq!(lightbox.selection(), Selection::Closed);

        projected(&store, &mut projection).await;
        assert_eq!(projection.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_after_delete_closes_viewer_on_removed_photo() {
        let store = FakeStore::new();
        let first = store.seed("a", 1);
        let second = store.seed("b", 2);
        let mut projection = Projection::default();
        projected(&store, &mut projection).await;

        let mut lightbox = Lightbox::default();
        lightbox.select(projection.photos(), first);
        assert!(lightbox.is_open());

        // Deleted from elsewhere while the viewer shows it
        assert_eq!(remove_photo(&store, first).await.unwrap(), first);
        projected(&store, &mut projection).await;
        lightbox.reconcile(projection.photos());

        assert_eq!(lightbox.selection(), Selection::Closed);
        let ids: Vec<_> = projection.photos().iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![second]);
    }
}
