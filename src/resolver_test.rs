use super::*;
use crate::fixture::{FixtureElement, FixturePage};
use pretty_assertions::assert_eq;

fn candidates(exprs: &[&str]) -> Vec<Selector> {
    exprs.iter().map(|e| Selector::parse(e).unwrap()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_probe_times_out_to_false() {
    let page = FixturePage::new();
    let start = Instant::now();
    let visible = probe_visible(
        &page,
        &Selector::css("#missing"),
        Duration::from_millis(5000),
        Duration::from_millis(100),
    )
    .await
    .unwrap();

    assert!(!visible);
    assert!(start.elapsed() >= Duration::from_millis(5000));
}

#[tokio::test(start_paused = true)]
async fn test_probe_waits_for_delayed_element() {
    let page = FixturePage::new().with_element(
        "#late",
        FixtureElement::visible("late").appearing_after(Duration::from_millis(1200)),
    );

    let visible = probe_visible(
        &page,
        &Selector::css("#late"),
        Duration::from_millis(5000),
        Duration::from_millis(100),
    )
    .await
    .unwrap();
    assert!(visible);
}

#[tokio::test(start_paused = true)]
async fn test_probe_propagates_driver_fault() {
    let page = FixturePage::new().with_faulty_selector("#boom");
    let result = probe_visible(
        &page,
        &Selector::css("#boom"),
        Duration::from_millis(5000),
        Duration::from_millis(100),
    )
    .await;
    assert!(matches!(result, Err(DriverError::Command(_))));
}

#[tokio::test(start_paused = true)]
async fn test_resolve_returns_first_visible_in_priority_order() {
    // Second and third candidates are both visible; the hidden first one is skipped
    let page = FixturePage::new()
        .with_element("text=О нас", FixtureElement::hidden("О нас"))
        .with_element("text=О компании", FixtureElement::visible("О компании"))
        .with_element("[href*='about']", FixtureElement::link("About", "/about/"));

    let resolver = LocatorResolver::default();
    let list = candidates(&["text=О нас", "text=О компании", "[href*='about']"]);
    let hit = resolver.resolve(&page, "About Us link", &list).await.unwrap();

    assert_eq!(hit, Selector::text("О компании"));
}

#[tokio::test(start_paused = true)]
async fn test_resolve_reports_all_candidates_when_none_visible() {
    let page = FixturePage::new();
    let resolver = LocatorResolver::default();
    let list = candidates(&["text=Блог", "[href*='blog']", "a:has-text('Blog')"]);

    let err = resolver.resolve(&page, "Blog link", &list).await.unwrap_err();
    match err {
        NavError::ElementNotFound { target, candidates } => {
            assert_eq!(target, "Blog link");
            assert_eq!(
                candidates,
                vec!["text=Блог", "[href*='blog']", "a:has-text('Blog')"]
            );
        }
        other => panic!("expected ElementNotFound, got {other:?}"),
    }
    assert!(page.clicks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_each_candidate_gets_its_own_timeout() {
    let page = FixturePage::new();
    let resolver = LocatorResolver::new(Duration::from_millis(1000));
    let list = candidates(&["#a", "#b", "#c"]);

    let start = Instant::now();
    let _ = resolver.resolve(&page, "target", &list).await;
    assert!(start.elapsed() >= Duration::from_millis(3000));
}

#[tokio::test(start_paused = true)]
async fn test_empty_candidate_list_is_not_found() {
    let page = FixturePage::new();
    let err = LocatorResolver::default()
        .resolve(&page, "nothing", &[])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        NavError::ElementNotFound { ref candidates, .. } if candidates.is_empty()
    ));
}

#[tokio::test(start_paused = true)]
async fn test_resolve_and_act_runs_action_once_on_winner() {
    let page = FixturePage::new()
        .with_element("text=Services", FixtureElement::link("Services", "/services/"))
        .with_element("[href*='service']", FixtureElement::link("Services", "/services/"));

    let list = candidates(&["text=Услуги", "text=Services", "[href*='service']"]);
    let acted_on = LocatorResolver::default()
        .resolve_and_act(&page, "Services link", &list, |selector| {
            let page = &page;
            async move {
                page.click(&selector).await?;
                Ok::<_, NavError>(selector)
            }
        })
        .await
        .unwrap();

    assert_eq!(acted_on, Selector::text("Services"));
    assert_eq!(page.clicks(), vec!["text=Services".to_string()]);
}
