//! Gallery manager behaviour tests.
//!
//! Run with: `cargo test -p vitrine-gallery --test gallery_test`

use async_trait::async_trait;
use std::sync::Arc;
use vitrine_core::{GalleryConfig, MediaId, MediaKind, PersistedMedia, RejectionReason};
use vitrine_gallery::{
    Gallery, InlinePreviewCodec, ItemRef, PreviewCodec, PreviewHandle, SourceFile,
};

const MIB: usize = 1024 * 1024;

/// Delegates to the inline codec but fails for files named `corrupt*`.
#[derive(Default)]
struct FlakyCodec {
    inner: InlinePreviewCodec,
}

#[async_trait]
impl PreviewCodec for FlakyCodec {
    async fn preview(&self, file: &SourceFile, kind: MediaKind) -> anyhow::Result<PreviewHandle> {
        if file.name.starts_with("corrupt") {
            anyhow::bail!("unreadable file");
        }
        self.inner.preview(file, kind).await
    }

    fn release(&self, handle: &PreviewHandle) {
        self.inner.release(handle)
    }
}

fn image(name: &str) -> SourceFile {
    SourceFile::new(name, "image/png", vec![7u8; 32])
}

fn video(name: &str, size: usize) -> SourceFile {
    SourceFile::new(name, "video/mp4", vec![0u8; size])
}

fn persisted(id: &str, order: i32, is_primary: bool) -> PersistedMedia {
    PersistedMedia {
        id: MediaId::from(id),
        location: format!("/media/product_media/{}.png", id),
        is_primary,
        order,
        created_at: None,
    }
}

fn empty_gallery() -> (Gallery, Arc<InlinePreviewCodec>) {
    let codec = Arc::new(InlinePreviewCodec::new());
    let gallery = Gallery::new(GalleryConfig::default(), codec.clone());
    (gallery, codec)
}

fn primary_count(gallery: &Gallery) -> usize {
    gallery.entries().iter().filter(|e| e.is_primary).count()
}

#[tokio::test]
async fn test_six_images_into_empty_gallery() {
    let (mut gallery, _) = empty_gallery();
    let files = (0..6).map(|i| image(&format!("img{}.png", i))).collect();

    let outcome = gallery.stage_files(files).await;

    assert_eq!(outcome.accepted.len(), 5);
    assert_eq!(outcome.rejections.len(), 1);
    assert_eq!(outcome.rejections[0].file_name, "img5.png");
    assert_eq!(
        outcome.rejections[0].reason,
        RejectionReason::CapacityExceeded { max_items: 5 }
    );
    assert_eq!(gallery.len(), 5);
    assert_eq!(gallery.primary(), Some(&ItemRef::Staged(outcome.accepted[0])));
    assert_eq!(primary_count(&gallery), 1);
}

#[tokio::test]
async fn test_capacity_accepts_first_k_in_input_order() {
    let codec = Arc::new(InlinePreviewCodec::new());
    let mut gallery = Gallery::with_persisted(
        GalleryConfig::default(),
        codec,
        vec![persisted("a", 0, true), persisted("b", 1, false)],
    );
    assert_eq!(gallery.remaining_capacity(), 3);

    let names = ["one.png", "two.png", "three.png", "four.png", "five.png"];
    let outcome = gallery
        .stage_files(names.iter().map(|n| image(n)).collect())
        .await;

    let staged: Vec<&str> = gallery
        .staged()
        .iter()
        .map(|item| item.source().name.as_str())
        .collect();
    assert_eq!(staged, vec!["one.png", "two.png", "three.png"]);
    let rejected: Vec<&str> = outcome
        .rejections
        .iter()
        .map(|r| r.file_name.as_str())
        .collect();
    assert_eq!(rejected, vec!["four.png", "five.png"]);
    assert!(outcome
        .rejections
        .iter()
        .all(|r| matches!(r.reason, RejectionReason::CapacityExceeded { .. })));
    assert_eq!(gallery.len(), 5);
}

#[tokio::test]
async fn test_full_gallery_rejects_everything() {
    let codec = Arc::new(InlinePreviewCodec::new());
    let media = (0..5).map(|i| persisted(&format!("m{}", i), i, i == 0)).collect();
    let mut gallery = Gallery::with_persisted(GalleryConfig::default(), codec, media);

    let outcome = gallery.stage_files(vec![image("extra.png")]).await;

    assert!(outcome.accepted.is_empty());
    assert_eq!(
        outcome.rejections[0].reason,
        RejectionReason::CapacityExceeded { max_items: 5 }
    );
    assert_eq!(gallery.len(), 5);
}

#[tokio::test]
async fn test_pdf_is_rejected_as_unsupported() {
    let (mut gallery, _) = empty_gallery();
    let outcome = gallery
        .stage_files(vec![
            SourceFile::new("tiny.pdf", "application/pdf", vec![1u8]),
            SourceFile::new("huge.pdf", "application/pdf", vec![1u8; 60 * MIB]),
        ])
        .await;

    assert!(outcome.accepted.is_empty());
    assert!(outcome
        .rejections
        .iter()
        .all(|r| matches!(r.reason, RejectionReason::UnsupportedType { .. })));
    assert!(gallery.is_empty());
    assert_eq!(gallery.primary(), None);
}

#[tokio::test]
async fn test_video_size_boundary() {
    let (mut gallery, _) = empty_gallery();
    let limit = 50 * MIB;

    let outcome = gallery
        .stage_files(vec![video("over.mp4", limit + 1), video("exact.mp4", limit)])
        .await;

    assert_eq!(outcome.accepted.len(), 1);
    assert_eq!(outcome.rejections.len(), 1);
    assert_eq!(outcome.rejections[0].file_name, "over.mp4");
    assert_eq!(
        outcome.rejections[0].reason,
        RejectionReason::FileTooLarge {
            size: (limit + 1) as u64,
            limit: limit as u64
        }
    );
    assert_eq!(gallery.staged()[0].source().name, "exact.mp4");
    assert_eq!(gallery.staged()[0].kind(), MediaKind::Video);
}

#[tokio::test]
async fn test_capacity_counts_invalid_files_in_input_order() {
    let config = GalleryConfig {
        max_items: 2,
        ..GalleryConfig::default()
    };
    let mut gallery = Gallery::new(config, Arc::new(InlinePreviewCodec::new()));

    let outcome = gallery
        .stage_files(vec![
            SourceFile::new("notes.txt", "text/plain", vec![1u8]),
            image("a.png"),
            image("b.png"),
            SourceFile::new("manual.pdf", "application/pdf", vec![1u8]),
        ])
        .await;

    assert_eq!(outcome.accepted.len(), 1);
    assert_eq!(gallery.staged()[0].source().name, "a.png");
    let rejected: Vec<(&str, &RejectionReason)> = outcome
        .rejections
        .iter()
        .map(|r| (r.file_name.as_str(), &r.reason))
        .collect();
    assert_eq!(rejected.len(), 3);
    assert!(matches!(rejected[0], ("notes.txt", RejectionReason::UnsupportedType { .. })));
    assert!(matches!(rejected[1], ("b.png", RejectionReason::CapacityExceeded { .. })));
    assert!(matches!(rejected[2], ("manual.pdf", RejectionReason::CapacityExceeded { .. })));
}

#[tokio::test]
async fn test_leading_pdf_still_caps_batch_at_capacity() {
    let (mut gallery, _) = empty_gallery();
    let mut files = vec![SourceFile::new("doc.pdf", "application/pdf", vec![1u8])];
    files.extend((0..5).map(|i| image(&format!("i{}.png", i))));

    let outcome = gallery.stage_files(files).await;

    assert_eq!(outcome.accepted.len(), 4);
    assert_eq!(outcome.rejections.len(), 2);
    assert!(matches!(
        outcome.rejections[0].reason,
        RejectionReason::UnsupportedType { .. }
    ));
    assert_eq!(outcome.rejections[1].file_name, "i4.png");
    assert_eq!(
        outcome.rejections[1].reason,
        RejectionReason::CapacityExceeded { max_items: 5 }
    );
    assert_eq!(primary_count(&gallery), 1);
}

#[tokio::test]
async fn test_preview_failure_drops_file_and_keeps_order() {
    let mut gallery = Gallery::new(GalleryConfig::default(), Arc::new(FlakyCodec::default()));

    let outcome = gallery
        .stage_files(vec![
            image("corrupt.png"),
            image("good.png"),
            SourceFile::new("doc.pdf", "application/pdf", vec![1u8]),
        ])
        .await;

    assert_eq!(outcome.accepted.len(), 1);
    assert_eq!(outcome.rejections.len(), 2);
    assert_eq!(outcome.rejections[0].file_name, "corrupt.png");
    assert!(matches!(
        outcome.rejections[0].reason,
        RejectionReason::PreviewFailed(_)
    ));
    assert_eq!(outcome.rejections[1].file_name, "doc.pdf");
    // The first file that actually made it in becomes primary.
    assert_eq!(gallery.primary(), Some(&ItemRef::Staged(outcome.accepted[0])));
}

#[tokio::test]
async fn test_second_batch_does_not_steal_primary() {
    let (mut gallery, _) = empty_gallery();
    let first = gallery.stage_files(vec![image("a.png")]).await;
    let second = gallery.stage_files(vec![image("b.png"), image("c.png")]).await;

    assert_eq!(gallery.primary(), Some(&ItemRef::Staged(first.accepted[0])));
    assert!(second
        .accepted
        .iter()
        .all(|id| !gallery.is_primary(&ItemRef::Staged(*id))));
    assert_eq!(primary_count(&gallery), 1);
}

#[tokio::test]
async fn test_persisted_primary_blocks_staged_primary() {
    let codec = Arc::new(InlinePreviewCodec::new());
    let mut gallery =
        Gallery::with_persisted(GalleryConfig::default(), codec, vec![persisted("p", 0, true)]);

    let outcome = gallery.stage_files(vec![image("a.png")]).await;

    assert!(!gallery.is_primary(&ItemRef::Staged(outcome.accepted[0])));
    assert_eq!(
        gallery.primary(),
        Some(&ItemRef::Persisted(MediaId::from("p")))
    );
}

#[tokio::test]
async fn test_set_primary_on_staged_demotes_persisted_locally() {
    let codec = Arc::new(InlinePreviewCodec::new());
    let mut gallery =
        Gallery::with_persisted(GalleryConfig::default(), codec, vec![persisted("p", 0, true)]);
    let outcome = gallery.stage_files(vec![image("a.png")]).await;
    let staged = ItemRef::Staged(outcome.accepted[0]);

    gallery.set_primary(&staged).unwrap();

    let entries = gallery.entries();
    assert!(!entries[0].is_primary);
    assert!(entries[1].is_primary);
    assert_eq!(primary_count(&gallery), 1);
    // Server state is untouched until submit.
    assert!(gallery.persisted()[0].is_primary);
}

#[tokio::test]
async fn test_set_primary_is_idempotent_and_rejects_unknown() {
    let (mut gallery, _) = empty_gallery();
    let outcome = gallery.stage_files(vec![image("a.png"), image("b.png")]).await;
    let second = ItemRef::Staged(outcome.accepted[1]);

    gallery.set_primary(&second).unwrap();
    gallery.set_primary(&second).unwrap();
    assert_eq!(gallery.primary(), Some(&second));

    let missing = ItemRef::Persisted(MediaId::from("nope"));
    assert!(gallery.set_primary(&missing).is_err());
    assert_eq!(gallery.primary(), Some(&second));
}

#[tokio::test]
async fn test_removing_staged_primary_promotes_next_staged() {
    let (mut gallery, _) = empty_gallery();
    let outcome = gallery
        .stage_files(vec![image("a.png"), image("b.png"), image("c.png")])
        .await;

    gallery.remove_staged(outcome.accepted[0]).unwrap();

    assert_eq!(gallery.primary(), Some(&ItemRef::Staged(outcome.accepted[1])));
    assert_eq!(primary_count(&gallery), 1);
}

#[tokio::test]
async fn test_removing_sole_staged_primary_empties_gallery() {
    let (mut gallery, _) = empty_gallery();
    let outcome = gallery.stage_files(vec![image("a.png")]).await;

    gallery.remove_staged(outcome.accepted[0]).unwrap();

    assert!(gallery.is_empty());
    assert_eq!(gallery.primary(), None);
}

#[tokio::test]
async fn test_removing_last_staged_primary_falls_back_to_persisted() {
    let codec = Arc::new(InlinePreviewCodec::new());
    let mut gallery = Gallery::with_persisted(
        GalleryConfig::default(),
        codec,
        vec![persisted("late", 3, false), persisted("early", 1, true)],
    );
    let outcome = gallery.stage_files(vec![image("a.png")]).await;
    gallery
        .set_primary(&ItemRef::Staged(outcome.accepted[0]))
        .unwrap();

    gallery.remove_staged(outcome.accepted[0]).unwrap();

    assert_eq!(
        gallery.primary(),
        Some(&ItemRef::Persisted(MediaId::from("early")))
    );
    assert_eq!(primary_count(&gallery), 1);
}

#[tokio::test]
async fn test_removing_non_primary_keeps_primary() {
    let (mut gallery, _) = empty_gallery();
    let outcome = gallery.stage_files(vec![image("a.png"), image("b.png")]).await;

    gallery.remove_staged(outcome.accepted[1]).unwrap();

    assert_eq!(gallery.primary(), Some(&ItemRef::Staged(outcome.accepted[0])));
    assert!(gallery.remove_staged(outcome.accepted[1]).is_err());
}

#[tokio::test]
async fn test_exactly_one_primary_through_mixed_operations() {
    let (mut gallery, _) = empty_gallery();
    let first = gallery.stage_files(vec![image("a.png"), image("b.png")]).await;
    assert_eq!(primary_count(&gallery), 1);

    gallery
        .set_primary(&ItemRef::Staged(first.accepted[1]))
        .unwrap();
    assert_eq!(primary_count(&gallery), 1);

    let second = gallery
        .stage_files(vec![image("c.png"), video("d.mp4", 10)])
        .await;
    assert_eq!(primary_count(&gallery), 1);

    gallery.remove_staged(first.accepted[1]).unwrap();
    assert_eq!(primary_count(&gallery), 1);
    gallery.remove_staged(first.accepted[0]).unwrap();
    assert_eq!(primary_count(&gallery), 1);
    gallery.remove_staged(second.accepted[0]).unwrap();
    assert_eq!(primary_count(&gallery), 1);
    gallery.remove_staged(second.accepted[1]).unwrap();
    assert_eq!(primary_count(&gallery), 0);
    assert!(gallery.is_empty());
}

#[tokio::test]
async fn test_video_preview_released_on_remove_and_drop() {
    let (mut gallery, codec) = empty_gallery();
    let outcome = gallery
        .stage_files(vec![video("a.mp4", 10), video("b.mp4", 10), image("c.png")])
        .await;
    assert_eq!(codec.live_object_urls(), 2);

    gallery.remove_staged(outcome.accepted[0]).unwrap();
    assert_eq!(codec.live_object_urls(), 1);

    drop(gallery);
    assert_eq!(codec.live_object_urls(), 0);
}

#[tokio::test]
async fn test_reconcile_continues_persisted_ordering() {
    let codec = Arc::new(InlinePreviewCodec::new());
    let mut gallery = Gallery::with_persisted(
        GalleryConfig::default(),
        codec,
        vec![persisted("a", 0, true), persisted("b", 1, false)],
    );
    gallery
        .stage_files(vec![image("x.png"), image("y.png"), video("z.mp4", 10)])
        .await;

    let plan = gallery.reconcile_on_submit("prod_1");

    let orders: Vec<i32> = plan.creates.iter().map(|c| c.order).collect();
    assert_eq!(orders, vec![2, 3, 4]);
    let names: Vec<&str> = plan.creates.iter().map(|c| c.file_name.as_str()).collect();
    assert_eq!(names, vec!["x.png", "y.png", "z.mp4"]);
    assert!(plan.creates.iter().all(|c| c.product_id == "prod_1"));
    assert!(plan.creates.iter().all(|c| !c.is_primary));
    assert!(plan.demotions.is_empty());
    assert!(plan.promotion.is_none());
}

#[tokio::test]
async fn test_reconcile_new_product_marks_first_primary() {
    let (mut gallery, _) = empty_gallery();
    gallery.stage_files(vec![image("a.png"), image("b.png")]).await;

    let plan = gallery.reconcile_on_submit("prod_2");

    assert_eq!(plan.creates[0].order, 0);
    assert!(plan.creates[0].is_primary);
    assert!(!plan.creates[1].is_primary);
    assert_eq!(plan.creates[1].payload.len(), 32);
    assert!(plan.primary_changes().is_empty());
}

#[tokio::test]
async fn test_reconcile_demotes_server_primary_for_staged_primary() {
    let codec = Arc::new(InlinePreviewCodec::new());
    let mut gallery =
        Gallery::with_persisted(GalleryConfig::default(), codec, vec![persisted("p", 0, true)]);
    let outcome = gallery.stage_files(vec![image("a.png")]).await;
    gallery
        .set_primary(&ItemRef::Staged(outcome.accepted[0]))
        .unwrap();

    let plan = gallery.reconcile_on_submit("prod_1");

    assert_eq!(plan.demotions, vec![MediaId::from("p")]);
    assert_eq!(plan.promotion, None);
    assert!(plan.creates[0].is_primary);
    assert_eq!(plan.primary_changes(), vec![MediaId::from("p")]);
}

#[test]
fn test_reconcile_swaps_persisted_primary() {
    let codec = Arc::new(InlinePreviewCodec::new());
    let mut gallery = Gallery::with_persisted(
        GalleryConfig::default(),
        codec,
        vec![persisted("a", 0, true), persisted("b", 1, false)],
    );
    gallery
        .set_primary(&ItemRef::Persisted(MediaId::from("b")))
        .unwrap();

    let plan = gallery.reconcile_on_submit("prod_1");

    assert!(plan.creates.is_empty());
    assert_eq!(plan.demotions, vec![MediaId::from("a")]);
    assert_eq!(plan.promotion, Some(MediaId::from("b")));
    assert_eq!(
        plan.primary_changes(),
        vec![MediaId::from("a"), MediaId::from("b")]
    );
}

#[test]
fn test_reconcile_unchanged_gallery_is_empty() {
    let codec = Arc::new(InlinePreviewCodec::new());
    let gallery =
        Gallery::with_persisted(GalleryConfig::default(), codec, vec![persisted("a", 0, true)]);
    assert!(gallery.reconcile_on_submit("prod_1").is_empty());
}

#[test]
fn test_delete_primary_promotes_lowest_order() {
    let codec = Arc::new(InlinePreviewCodec::new());
    let mut gallery = Gallery::with_persisted(
        GalleryConfig::default(),
        codec,
        vec![
            persisted("primary", 0, true),
            persisted("third", 7, false),
            persisted("second", 2, false),
        ],
    );

    let plan = gallery.delete_persisted(&MediaId::from("primary")).unwrap();
    assert_eq!(plan.delete, MediaId::from("primary"));
    assert_eq!(plan.promote, Some(MediaId::from("second")));
    // Planning alone changes nothing.
    assert_eq!(gallery.len(), 3);

    gallery.confirm_deleted(&plan);
    assert_eq!(gallery.len(), 2);
    assert_eq!(
        gallery.primary(),
        Some(&ItemRef::Persisted(MediaId::from("second")))
    );
}

#[test]
fn test_delete_non_primary_promotes_nothing() {
    let codec = Arc::new(InlinePreviewCodec::new());
    let gallery = Gallery::with_persisted(
        GalleryConfig::default(),
        codec,
        vec![persisted("a", 0, true), persisted("b", 1, false)],
    );

    let plan = gallery.delete_persisted(&MediaId::from("b")).unwrap();
    assert_eq!(plan.promote, None);
    assert!(gallery.delete_persisted(&MediaId::from("zzz")).is_err());
}

#[tokio::test]
async fn test_delete_last_persisted_primary_hands_over_to_staged() {
    let codec = Arc::new(InlinePreviewCodec::new());
    let mut gallery =
        Gallery::with_persisted(GalleryConfig::default(), codec, vec![persisted("p", 0, true)]);
    let outcome = gallery.stage_files(vec![image("a.png"), image("b.png")]).await;

    let plan = gallery.delete_persisted(&MediaId::from("p")).unwrap();
    assert_eq!(plan.promote, None);

    gallery.confirm_deleted(&plan);
    assert_eq!(gallery.primary(), Some(&ItemRef::Staged(outcome.accepted[0])));
    assert_eq!(primary_count(&gallery), 1);
}

#[tokio::test]
async fn test_reset_from_server_discards_staged() {
    let (mut gallery, codec) = empty_gallery();
    gallery
        .stage_files(vec![video("a.mp4", 10), image("b.png")])
        .await;

    gallery.reset_from_server(vec![persisted("x", 1, false), persisted("y", 0, true)]);

    assert!(gallery.staged().is_empty());
    assert_eq!(codec.live_object_urls(), 0);
    assert_eq!(gallery.persisted()[0].id.as_str(), "y");
    assert_eq!(
        gallery.primary(),
        Some(&ItemRef::Persisted(MediaId::from("y")))
    );
}

#[tokio::test]
async fn test_sync_persisted_keeps_staged_items() {
    let codec = Arc::new(InlinePreviewCodec::new());
    let mut gallery = Gallery::with_persisted(
        GalleryConfig::default(),
        codec.clone(),
        vec![persisted("a", 0, true), persisted("b", 1, false)],
    );
    let outcome = gallery.stage_files(vec![video("clip.mp4", 10)]).await;

    gallery.sync_persisted(vec![persisted("b", 1, true)]);

    assert_eq!(gallery.staged().len(), 1);
    assert_eq!(codec.live_object_urls(), 1);
    assert_eq!(
        gallery.primary(),
        Some(&ItemRef::Persisted(MediaId::from("b")))
    );

    gallery.sync_persisted(Vec::new());
    assert_eq!(gallery.primary(), Some(&ItemRef::Staged(outcome.accepted[0])));
}

#[test]
fn test_sync_without_server_primary_falls_back_to_lowest_order() {
    let mut gallery = Gallery::with_persisted(
        GalleryConfig::default(),
        Arc::new(InlinePreviewCodec::new()),
        vec![persisted("a", 0, true), persisted("b", 1, false), persisted("c", 2, false)],
    );

    gallery.sync_persisted(vec![persisted("c", 2, false), persisted("b", 1, false)]);

    assert_eq!(
        gallery.primary(),
        Some(&ItemRef::Persisted(MediaId::from("b")))
    );
    assert_eq!(primary_count(&gallery), 1);
}

#[test]
fn test_reset_without_server_primary_picks_first_in_display_order() {
    let mut gallery = Gallery::new(GalleryConfig::default(), Arc::new(InlinePreviewCodec::new()));

    gallery.reset_from_server(vec![persisted("late", 3, false), persisted("early", 1, false)]);

    assert_eq!(
        gallery.primary(),
        Some(&ItemRef::Persisted(MediaId::from("early")))
    );
    assert_eq!(primary_count(&gallery), 1);
}
