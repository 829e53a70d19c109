use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crossplay_engine::board::{Board, Orientation, Pos};
use crossplay_engine::dictionary::Dictionary;
use crossplay_engine::gaddag::Gaddag;
use crossplay_engine::move_gen::MoveGenerator;

fn sample_words() -> Vec<&'static str> {
    vec![
        "RETAINS", "RETINAS", "NASTIER", "ANTSIER", "STRAINER", "CARES", "CARE", "CARS", "CAR",
        "CAT", "CATS", "DOG", "DOGS", "BAT", "BATS", "RATS", "RATE", "RATES", "STARE", "STARED",
        "TEARS", "TARES", "SATIRE", "ARTIST", "ARTISTE", "ANTIRES",
    ]
}

fn two_letter_words() -> Vec<&'static str> {
    vec!["AT", "AS", "AR", "TS", "RE", "ES", "AN", "IN", "IT", "IS", "TO"]
}

fn opening_board() -> Board {
    Board::new()
}

fn midgame_board() -> Board {
    let mut board = Board::new();
    board
        .place_word("CARES", Pos::new(8, 6), Orientation::Horizontal, &[])
        .unwrap();
    board
        .place_word("STARE", Pos::new(6, 7), Orientation::Vertical, &[])
        .unwrap();
    board
}

fn bench_move_generation(c: &mut Criterion) {
    let dictionary = Dictionary::build(
        sample_words().into_iter().map(String::from),
        two_letter_words().into_iter().map(String::from),
    )
    .with_indices();
    let gaddag = Gaddag::build_from_dictionary(sample_words(), two_letter_words());
    let generator = MoveGenerator::new(&gaddag, &dictionary);

    let opening = opening_board();
    c.bench_function("generate_opening_rack", |b| {
        b.iter(|| generator.generate(black_box(&opening), black_box("AEINRST")))
    });

    let midgame = midgame_board();
    c.bench_function("generate_midgame_rack", |b| {
        b.iter(|| generator.generate(black_box(&midgame), black_box("ANTSIER")))
    });
}

fn bench_gaddag_build(c: &mut Criterion) {
    c.bench_function("build_gaddag_from_sample_dictionary", |b| {
        b.iter(|| Gaddag::build_from_dictionary(black_box(sample_words()), black_box(two_letter_words())))
    });
}

criterion_group!(benches, bench_move_generation, bench_gaddag_build);
criterion_main!(benches);
