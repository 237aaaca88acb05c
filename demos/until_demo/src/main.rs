use std::time::Duration;

use hookwork_core::{
    EventKind, EventTarget, InputEvent, KeyModifier, ModifierState, UseModifierOptions,
    use_key_modifier,
};
use hookwork_reactive::{Scope, signal};
use hookwork_shared::{UntilOptions, create_global_state, until};

thread_local! {
    static COUNTER: hookwork_shared::GlobalState<hookwork_reactive::Signal<u32>> =
        create_global_state(|| signal(0));
}

fn counter() -> hookwork_reactive::Signal<u32> {
    COUNTER.with(|c| c.get())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let count = counter();
    let ticker = {
        let count = count.clone();
        async move {
            for _ in 0..10 {
                tokio::time::sleep(Duration::from_millis(100)).await;
                let next = count.get() + 1;
                count.set(next);
            }
        }
    };

    let past_seven = until(&count).to_match(|v| *v > 7, UntilOptions::default())?;
    let stays_low = until(&count)
        .not()
        .to_match(|v| *v < 100, UntilOptions::new().timeout(Duration::from_millis(300)))?;

    let (seven, low, ()) = tokio::join!(past_seven, stays_low, ticker);
    log::info!("counter passed seven at {}", seven?);
    log::info!("after 300ms the counter held {}", low?);

    // A global counter is the same signal wherever it is requested.
    assert_eq!(counter().get(), count.get());

    let scope = Scope::new();
    let target = EventTarget::new();
    let shift = scope.run(|| {
        use_key_modifier(
            KeyModifier::Shift,
            UseModifierOptions::default().target(Some(target.clone())),
        )
    });
    let held = until(&shift).to_be(Some(true), UntilOptions::default())?;
    target.dispatch(&InputEvent::new(EventKind::KeyDown, ModifierState::SHIFT));
    log::info!("shift held: {:?}", held.await?);
    scope.dispose();

    Ok(())
}
