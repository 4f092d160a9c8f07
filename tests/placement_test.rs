//! Property tests for spine placement and NCX play order.

use bindery::epub::{SpinePlan, SpineSlot};
use bindery::{BookOptions, ContentItem, EpubComposer, MemoryLoader, RandomNames, TocOptions};
use proptest::prelude::*;

fn section_ids(before: usize, after: usize) -> Vec<(String, bool)> {
    (0..before + after)
        .map(|i| (format!("i_{i}_s"), i < before))
        .collect()
}

fn position(refs: &[String], id: &str) -> Option<usize> {
    refs.iter().position(|r| r == id)
}

fn book(before: usize, subtitles: &[usize], excluded: &[bool], toc_in_spine: bool) -> BookOptions {
    let mut options = BookOptions::new("T", "A");
    if !toc_in_spine {
        options = options.with_toc(TocOptions::default().exclude_from_spine());
    }
    for (i, &subs) in subtitles.iter().enumerate() {
        let data: String = (0..subs)
            .map(|n| format!(r#"<h2 data-ec-role="subtitle">Part {n}</h2><p>text</p>"#))
            .collect();
        let mut item = ContentItem::new(data).with_title(format!("Section {i}"));
        if i < before {
            item = item.before_toc();
        }
        if excluded[i] {
            item = item.exclude_from_toc();
        }
        options = options.with_item(item);
    }
    options
}

fn play_orders(ncx: &str) -> Vec<usize> {
    ncx.match_indices("playOrder=\"")
        .filter_map(|(i, m)| {
            let rest = &ncx[i + m.len()..];
            rest[..rest.find('"')?].parse().ok()
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_spine_placement(
        before in 0usize..4,
        after in 0usize..6,
        has_cover: bool,
        toc_in_spine: bool,
    ) {
        let sections = section_ids(before, after);
        let plan = SpinePlan { has_cover, toc_in_spine };
        let refs = plan.idrefs(sections.iter().map(|(id, b)| (id.as_str(), *b)));

        // Every entry appears exactly once
        let expected = sections.len() + 1 + usize::from(has_cover) + usize::from(toc_in_spine);
        prop_assert_eq!(refs.len(), expected);
        let unique: std::collections::HashSet<_> = refs.iter().collect();
        prop_assert_eq!(unique.len(), refs.len());

        // Sections keep their relative order
        let section_refs: Vec<_> = refs.iter().filter(|r| r.starts_with("i_")).cloned().collect();
        let ids: Vec<_> = sections.iter().map(|(id, _)| id.clone()).collect();
        prop_assert_eq!(section_refs, ids);

        let credit = position(&refs, "creditpage").unwrap();
        if has_cover {
            prop_assert_eq!(position(&refs, "coverpage"), Some(0));
            prop_assert_eq!(credit, 1);
        } else if toc_in_spine {
            prop_assert_eq!(position(&refs, "toc").map(|t| t + 1), Some(credit));
        } else {
            prop_assert_eq!(credit, 0);
        }

        if let Some(toc) = position(&refs, "toc") {
            for (id, before_toc) in &sections {
                let at = position(&refs, id).unwrap();
                prop_assert_eq!(at < toc, *before_toc, "{} misplaced around toc", id);
            }
        }
    }

    #[test]
    fn prop_slots_cover_every_kind_once(has_cover: bool, toc_in_spine: bool) {
        let slots = SpinePlan { has_cover, toc_in_spine }.slots();
        prop_assert_eq!(slots.contains(&SpineSlot::CoverPage), has_cover);
        prop_assert_eq!(slots.contains(&SpineSlot::Toc), toc_in_spine);
        prop_assert_eq!(slots.iter().filter(|s| **s == SpineSlot::CreditPage).count(), 1);
    }

    #[test]
    fn prop_play_order_is_dense(
        layout in (1usize..5).prop_flat_map(|n| (
            0..=n,
            prop::collection::vec(0usize..3, n),
            prop::collection::vec(any::<bool>(), n),
        )),
        toc_in_spine: bool,
        seed: u64,
    ) {
        let (before, subtitles, excluded) = layout;
        let options = book(before, &subtitles, &excluded, toc_in_spine);
        let archive = EpubComposer::new(options)
            .unwrap()
            .with_loader(MemoryLoader::new())
            .with_names(RandomNames::seeded(seed))
            .assemble()
            .unwrap();
        let ncx = String::from_utf8(archive.get("OEBPS/toc.ncx").unwrap().to_vec()).unwrap();

        let orders = play_orders(&ncx);
        let listed: usize = subtitles
            .iter()
            .zip(&excluded)
            .filter(|(_, hidden)| !**hidden)
            .map(|(subs, _)| 1 + subs)
            .sum();
        prop_assert_eq!(orders.len(), listed + 1);
        prop_assert_eq!(orders, (0..listed + 1).collect::<Vec<_>>());
    }
}
