//! Daily tick against an in-process store.

mod common;

use std::str::FromStr;
use std::sync::Arc;

use cron::Schedule;
use day_count_bot::scheduler::DailyScheduler;

use common::{GROUP, Harness, document};

fn scheduler(bot: &Harness) -> DailyScheduler {
    DailyScheduler::new(
        Arc::clone(&bot.cache),
        Arc::clone(&bot.notifier),
        Schedule::from_str("0 0 5 * * *").unwrap(),
        chrono_tz::Asia::Phnom_Penh,
        "Day {count} of the journey".to_owned(),
    )
}

#[tokio::test]
async fn tick_increments_and_announces_once() {
    let bot = Harness::seeded(document(10, &[], Some(GROUP)));

    let announced = scheduler(&bot).tick().await.unwrap();

    assert_eq!(bot.stored().await.day_count, 11);
    assert_eq!(bot.cache.get().unwrap().day_count, 11);

    let sent = bot.messenger.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(announced, Some(sent[0].message_id));
    assert_eq!(sent[0].chat_id, GROUP);
    assert_eq!(sent[0].text, "Day 11 of the journey");
}

#[tokio::test]
async fn tick_without_group_only_increments() {
    let bot = Harness::seeded(document(10, &[], None));

    let announced = scheduler(&bot).tick().await.unwrap();

    assert_eq!(announced, None);
    assert_eq!(bot.stored().await.day_count, 11);
    assert!(bot.messenger.sent().is_empty());
}

#[tokio::test]
async fn consecutive_ticks_count_up() {
    let bot = Harness::seeded(document(0, &[], Some(GROUP)));
    let scheduler = scheduler(&bot);

    for _ in 0..3 {
        scheduler.tick().await.unwrap();
    }

    let texts: Vec<_> = bot.messenger.sent().into_iter().map(|s| s.text).collect();
    assert_eq!(
        texts,
        vec![
            "Day 1 of the journey",
            "Day 2 of the journey",
            "Day 3 of the journey"
        ]
    );
}
