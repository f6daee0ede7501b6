/// Scripted playthrough — drives the engine through a month of business
/// days, always picking the first affordable choice, and prints the ending.
///
/// Run with: cargo run --example playthrough

use cafe_story_engine::core::daily::DailyEvent;
use cafe_story_engine::core::engine::{NextContent, StoryEngine};
use cafe_story_engine::core::executor::Advance;
use cafe_story_engine::schema::chapter::{Chapter, NodeKind};
use cafe_story_engine::schema::state::{DayReport, GameState};

enum Today {
    Scene(Chapter, String),
    GameOver,
    Decision(String),
    Quiet,
}

fn main() {
    let mut engine = StoryEngine::builder()
        .seed(2026)
        .chapters_path("tests/fixtures/chapters.ron")
        .build()
        .expect("failed to load chapters");

    let mut state = engine.new_game();

    for _ in 0..30 {
        println!(
            "--- Day {} (money {}, rep {}) ---",
            state.day, state.money, state.reputation
        );

        let today = match engine.next_content(&mut state, None) {
            Some(NextContent::Chapter { chapter, current }) => {
                println!("[chapter] {}", chapter.title);
                Today::Scene(chapter.clone(), current)
            }
            Some(NextContent::Daily(DailyEvent::GameOver { kind })) => {
                println!("[game over] {:?}", kind);
                Today::GameOver
            }
            Some(NextContent::Daily(DailyEvent::RouteLock { character })) => {
                let name = engine
                    .cast()
                    .get(character)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                Today::Decision(name)
            }
            Some(NextContent::Daily(
                DailyEvent::World { scene }
                | DailyEvent::Introduction { scene, .. }
                | DailyEvent::Visit { scene, .. },
            )) => {
                println!("[scene] {}", scene.title);
                let entry = scene.entry().map(|e| e.id.clone()).unwrap_or_default();
                Today::Scene(scene, entry)
            }
            None => Today::Quiet,
        };

        match today {
            Today::Scene(scene, entry) => walk(&engine, &mut state, &scene, entry),
            Today::GameOver => break,
            Today::Decision(name) => println!("[decision] Commit to {}'s route?", name),
            Today::Quiet => println!("A quiet day."),
        }

        // The out-of-scope walk-in simulation, stubbed as a steady trickle.
        engine.apply_day_report(
            &mut state,
            &DayReport {
                profit: 850,
                reputation_delta: 1,
                visitors: Vec::new(),
            },
        );
    }

    let ending = engine.resolve_ending(&state);
    println!("\n=== {:?} (score {}) ===", ending.category, ending.score);
    println!("{}", ending.text);
}

/// Walks a chapter or scene to its end, preferring the first choice and
/// falling back to later ones when a costly option is refused.
fn walk(engine: &StoryEngine, state: &mut GameState, scene: &Chapter, mut current: String) {
    loop {
        let Some(node) = scene.event(&current) else {
            return;
        };
        if let Some(text) = &node.text {
            println!("  {}", text);
        }

        let picks: Vec<Option<usize>> = if node.kind == NodeKind::Choice {
            (0..node.choices.len()).map(Some).collect()
        } else {
            vec![None]
        };

        let mut advanced = false;
        for pick in picks {
            if let Some(index) = pick {
                println!("  > {}", node.choices[index].label);
            }
            match engine
                .advance_scene(state, scene, &current, pick)
                .expect("advance failed")
            {
                Advance::Next(next) => {
                    current = next;
                    advanced = true;
                    break;
                }
                Advance::Refused => {
                    println!("  (can't afford that)");
                    continue;
                }
                Advance::Finished => return,
            }
        }
        if !advanced {
            return;
        }
    }
}
