use super::*;

use std::time::Duration;

use shared::{
    domain::{MealPlan, ShoppingItemId},
    error::FailureKind,
};

use crate::{
    presentation::TIMEOUT_MESSAGE,
    test_support::{
        context, run_next_job, sample_store, scripted_workers, store_context, today,
        RecordingNavigator, ScriptedWorker,
    },
    ui::UiContext,
};

fn cart_with(quantities: &[u32]) -> ShoppingCart {
    let mut cart = ShoppingCart::new();
    for (index, quantity) in quantities.iter().enumerate() {
        cart.add_item(ShoppingItem {
            item_id: ShoppingItemId(index as i64 + 1),
            name: format!("item-{index}"),
            quantity: *quantity,
            checked: false,
        });
    }
    cart
}

#[tokio::test]
async fn loading_seeded_cart_reports_total_of_seven() {
    let store = sample_store();
    let mut ui = UiContext::new();
    let module = ShoppingListRouter::create_module(&store_context(&store, &ui));

    module.view_model().load_shopping_cart().expect("interactor bound");
    assert!(module.view_model().is_loading());
    run_next_job(&mut ui).await;

    let screen = module.render();
    assert_eq!(screen.total_items, 7);
    assert_eq!(
        screen.items.iter().map(|item| item.quantity).collect::<Vec<_>>(),
        vec![2, 1, 4]
    );
    assert!(!screen.state.is_loading);
    assert_eq!(screen.state.error_message, None);
}

#[tokio::test]
async fn presented_cart_replaces_store_cart() {
    let store = sample_store();
    let mut ui = UiContext::new();
    let worker = Arc::new(ScriptedWorker::ok(
        MealPlan::week_starting(today()),
        cart_with(&[3, 3]),
    ));
    let module = ShoppingListRouter::create_module(&context(
        &store,
        &ui,
        scripted_workers(worker),
        Arc::new(RecordingNavigator::default()),
    ));

    module.view_model().load_shopping_cart();
    run_next_job(&mut ui).await;

    assert_eq!(module.view_model().total_items(), 6);
    assert_eq!(store.snapshot().shopping_cart, cart_with(&[3, 3]));
}

#[tokio::test]
async fn timeout_failure_uses_fixed_timeout_message() {
    let store = sample_store();
    let before = store.snapshot();
    let mut ui = UiContext::new();
    let worker = Arc::new(ScriptedWorker::failing(AppError::new(
        FailureKind::Timeout,
        "cart service",
    )));
    let module = ShoppingListRouter::create_module(&context(
        &store,
        &ui,
        scripted_workers(worker),
        Arc::new(RecordingNavigator::default()),
    ));

    module.view_model().load_shopping_cart();
    run_next_job(&mut ui).await;

    assert!(!module.view_model().is_loading());
    assert_eq!(
        module.view_model().error_message().as_deref(),
        Some(TIMEOUT_MESSAGE)
    );
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn double_tap_runs_two_independent_fetches() {
    let store = sample_store();
    let mut ui = UiContext::new();
    let worker = Arc::new(
        ScriptedWorker::ok(MealPlan::week_starting(today()), cart_with(&[1]))
            .with_delay(Duration::from_millis(5)),
    );
    let module = ShoppingListRouter::create_module(&context(
        &store,
        &ui,
        scripted_workers(worker.clone()),
        Arc::new(RecordingNavigator::default()),
    ));

    let first = module.view_model().load_shopping_cart().expect("bound");
    let second = module.view_model().load_shopping_cart().expect("bound");
    first.await.expect("first fetch");
    second.await.expect("second fetch");

    assert_eq!(worker.calls(), 2);
    assert_eq!(ui.run_pending(), 2);
    assert_eq!(module.view_model().total_items(), 1);
    assert!(!module.view_model().is_loading());
}

#[test]
fn cart_total_follows_store_mutations() {
    let store = sample_store();
    let ui = UiContext::new();
    let module = ShoppingListRouter::create_module(&store_context(&store, &ui));

    assert_eq!(module.view_model().total_items(), 7);
    store.update(|state| {
        state.shopping_cart.set_quantity(ShoppingItemId(3), 1);
    });
    assert_eq!(module.view_model().total_items(), 4);
    store.update(|state| {
        state.shopping_cart.remove_item(ShoppingItemId(1));
    });
    assert_eq!(module.view_model().total_items(), 2);
    assert_eq!(module.view_model().cart().items().len(), 2);
}

#[test]
fn navigate_to_meal_planner_selects_tab() {
    let store = sample_store();
    store.update(|state| state.selected_tab = Tab::ShoppingList);
    let ui = UiContext::new();
    let module = ShoppingListRouter::create_module(&store_context(&store, &ui));

    module.view_model().navigate_to_meal_planner();
    assert_eq!(store.snapshot().selected_tab, Tab::MealPlanner);
}
