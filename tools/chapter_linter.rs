/// Chapter Linter — validates authored chapter graphs before they ship.
///
/// Usage: chapter_linter <chapters.ron> [--cast <cast.ron>]
///
/// The executor treats dangling references as soft chapter termination at
/// runtime; this tool surfaces them at authoring time instead.

use cafe_story_engine::schema::chapter::{ChapterSet, NodeKind, Successor};
use cafe_story_engine::schema::character::CharacterRegistry;
use std::collections::HashSet;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: chapter_linter <chapters.ron> [--cast <cast.ron>]");
        process::exit(0);
    }

    let chapters_path = &args[1];
    let mut cast_path = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--cast" && i + 1 < args.len() {
            i += 1;
            cast_path = Some(args[i].clone());
        }
        i += 1;
    }

    let chapters = match ChapterSet::load_from_ron(Path::new(chapters_path)) {
        Ok(set) => set,
        Err(e) => {
            eprintln!("ERROR: Failed to load chapters: {}", e);
            process::exit(1);
        }
    };

    let cast = match cast_path {
        Some(ref path) => match CharacterRegistry::load_from_ron(Path::new(path)) {
            Ok(cast) => cast,
            Err(e) => {
                eprintln!("ERROR: Failed to load cast: {}", e);
                process::exit(1);
            }
        },
        None => CharacterRegistry::default_cast(),
    };

    println!("Loaded {} chapters", chapters.len());

    let (errors, warnings) = lint_chapters(&chapters, &cast);

    println!("\n=== Chapter Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }
    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\n{} error(s), {} warning(s)",
        errors.len(),
        warnings.len()
    );

    if !errors.is_empty() {
        process::exit(1);
    }
}

fn lint_chapters(chapters: &ChapterSet, cast: &CharacterRegistry) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for chapter in &chapters.chapters {
        let ids: HashSet<&str> = chapter.events.iter().map(|e| e.id.as_str()).collect();
        let mut reachable: HashSet<&str> = HashSet::new();

        // Reachability: walk every successor edge, including fall-through.
        let mut pending: Vec<usize> = match chapter.events.first() {
            Some(_) => vec![0],
            None => Vec::new(),
        };
        while let Some(index) = pending.pop() {
            let node = &chapter.events[index];
            if !reachable.insert(node.id.as_str()) {
                continue;
            }
            let mut successors: Vec<&Successor> = vec![&node.next];
            if node.kind == NodeKind::Choice {
                successors = node.choices.iter().map(|c| &c.next).collect();
            }
            for successor in successors {
                match successor {
                    Successor::Goto(target) => match chapter.event_index(target) {
                        Some(i) => pending.push(i),
                        None => errors.push(format!(
                            "chapter `{}`: event `{}` jumps to unknown event `{}`",
                            chapter.id, node.id, target
                        )),
                    },
                    Successor::Continue => {
                        if index + 1 < chapter.events.len() {
                            pending.push(index + 1);
                        }
                    }
                    Successor::End => {}
                }
            }
        }

        for id in &ids {
            if !reachable.contains(id) {
                warnings.push(format!(
                    "chapter `{}`: event `{}` is unreachable from the entry node",
                    chapter.id, id
                ));
            }
        }

        for event in &chapter.events {
            if event.kind == NodeKind::Choice && event.choices.is_empty() {
                errors.push(format!(
                    "chapter `{}`: choice event `{}` has no options",
                    chapter.id, event.id
                ));
            }
            if event.kind != NodeKind::Choice && !event.choices.is_empty() {
                warnings.push(format!(
                    "chapter `{}`: event `{}` carries options but is not a choice node",
                    chapter.id, event.id
                ));
            }
            if let Some(speaker) = event.speaker {
                if cast.get(speaker).is_none() {
                    warnings.push(format!(
                        "chapter `{}`: event `{}` speaker {:?} is not in the cast",
                        chapter.id, event.id, speaker
                    ));
                }
            }
        }
    }

    (errors, warnings)
}
