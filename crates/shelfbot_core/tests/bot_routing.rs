use rusqlite::Connection;
use shelfbot_core::bot::render;
use shelfbot_core::bot::{Actor, Bot, Choice, Command, Inbound, Menu, Payload, Response};
use shelfbot_core::db::open_db_in_memory;
use shelfbot_core::dialogue::StateTag;
use shelfbot_core::{
    AccessPolicy, BookRepository, EditableField, FavoriteRepository, Genre, NewBook,
    SqliteBookRepository, SqliteFavoriteRepository, SqliteUserRepository, UserRepository,
};

const ADMIN: i64 = 10;
const READER: i64 = 20;

fn bot() -> Bot {
    Bot::new(AccessPolicy::new([ADMIN]))
}

fn send(bot: &Bot, conn: &Connection, user: i64, payload: Payload) -> Response {
    bot.handle(
        conn,
        &Inbound {
            conversation: user,
            actor: Actor {
                id: user,
                handle: Some(format!("user{user}")),
            },
            payload,
        },
    )
    .unwrap()
}

fn command(bot: &Bot, conn: &Connection, user: i64, command: Command) -> Response {
    send(bot, conn, user, Payload::Command(command))
}

fn text(bot: &Bot, conn: &Connection, user: i64, text: &str) -> Response {
    send(bot, conn, user, Payload::Text(text.to_string()))
}

fn choose(bot: &Bot, conn: &Connection, user: i64, choice: Choice) -> Response {
    send(bot, conn, user, Payload::Choice(choice))
}

fn seed_book(conn: &Connection, title: &str, year: i32, genre: Genre) -> i64 {
    SqliteBookRepository::new(conn)
        .create_book(&NewBook {
            title: title.to_string(),
            author: "Author".to_string(),
            year,
            description: "Описание".to_string(),
            genre,
            subgenre: None,
            file: None,
        })
        .unwrap()
}

#[test]
fn every_action_registers_the_user() {
    let conn = open_db_in_memory().unwrap();
    let bot = bot();

    let response = command(&bot, &conn, READER, Command::Start);
    assert!(response.text.contains("user20"));
    assert_eq!(response.menu, Some(Menu::Main { admin: false }));

    let admin_start = command(&bot, &conn, ADMIN, Command::Start);
    assert_eq!(admin_start.menu, Some(Menu::Main { admin: true }));

    let users = SqliteUserRepository::new(&conn);
    assert_eq!(users.count_users().unwrap(), 2);
    assert_eq!(
        users.get_user(READER).unwrap().unwrap().handle.as_deref(),
        Some("user20")
    );
}

#[test]
fn non_admin_is_denied_every_admin_surface() {
    let conn = open_db_in_memory().unwrap();
    let book_id = seed_book(&conn, "Book", 2000, Genre::Literature);
    let bot = bot();

    for admin_command in [
        Command::AdminPanel,
        Command::AddBook,
        Command::EditBooks,
        Command::Statistics,
    ] {
        let response = command(&bot, &conn, READER, admin_command);
        assert!(response.text.contains('❌'), "{admin_command:?} should be denied");
        assert!(response.choices.is_empty());
    }
    for choice in [
        Choice::EditBook { book_id },
        Choice::EditField {
            book_id,
            field: EditableField::Title,
        },
        Choice::DeleteBook { book_id },
        Choice::ConfirmDelete { book_id },
        Choice::BackToEditList,
    ] {
        let response = choose(&bot, &conn, READER, choice);
        assert!(response.text.contains('❌'));
    }

    assert_eq!(bot.engine().current(READER), None);
    assert!(SqliteBookRepository::new(&conn)
        .get_book(book_id)
        .unwrap()
        .is_some());
}

#[test]
fn admin_adds_book_through_the_dialogue() {
    let conn = open_db_in_memory().unwrap();
    let bot = bot();

    let panel = command(&bot, &conn, ADMIN, Command::AdminPanel);
    assert_eq!(panel.menu, Some(Menu::Admin));

    let prompt = text(&bot, &conn, ADMIN, Command::AddBook.label());
    assert_eq!(prompt.text, "Введите название книги:");
    text(&bot, &conn, ADMIN, "Солярис");
    let reprompt = text(&bot, &conn, ADMIN, "год");
    assert!(reprompt.text.contains("корректный год"));
    text(&bot, &conn, ADMIN, "1961");
    text(&bot, &conn, ADMIN, "Станислав Лем");
    let genre_prompt = text(&bot, &conn, ADMIN, "Океан разумен.");
    assert_eq!(genre_prompt.buttons().count(), Genre::ALL.len());

    let subgenre_prompt = choose(
        &bot,
        &conn,
        ADMIN,
        Choice::PickGenre {
            genre: Genre::Literature,
        },
    );
    let subgenre_choices = subgenre_prompt
        .buttons()
        .map(|button| button.choice.clone())
        .collect::<Vec<_>>();
    assert_eq!(subgenre_choices.len(), Genre::Literature.subgenres().len() + 1);
    assert_eq!(
        subgenre_choices.last(),
        Some(&Choice::PickSubgenre { subgenre: None })
    );

    let done = choose(
        &bot,
        &conn,
        ADMIN,
        Choice::PickSubgenre {
            subgenre: Some("Фантастика".to_string()),
        },
    );
    assert!(done.text.contains("Солярис"));
    assert_eq!(done.menu, Some(Menu::Admin));

    let results = SqliteBookRepository::new(&conn)
        .search_by_title_or_author("солярис")
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].author, "Станислав Лем");
    assert_eq!(results[0].subgenre.as_deref(), Some("Фантастика"));
}

#[test]
fn cancel_label_leaves_flow_without_using_it_as_value() {
    let conn = open_db_in_memory().unwrap();
    let bot = bot();

    command(&bot, &conn, ADMIN, Command::AddBook);
    let response = text(&bot, &conn, ADMIN, Command::Cancel.label());
    assert_eq!(response.text, render::CANCELLED);
    assert_eq!(bot.engine().current(ADMIN), None);
    assert_eq!(
        SqliteBookRepository::new(&conn).count_books(None).unwrap(),
        0
    );
}

#[test]
fn menu_label_mid_flow_starts_that_flow() {
    let conn = open_db_in_memory().unwrap();
    let bot = bot();

    command(&bot, &conn, ADMIN, Command::AddBook);
    text(&bot, &conn, ADMIN, "Dune");
    text(&bot, &conn, ADMIN, "1965");
    assert_eq!(bot.engine().current(ADMIN), Some(StateTag::WaitingAuthor));

    let prompt = text(&bot, &conn, ADMIN, Command::Search.label());
    assert!(prompt.text.contains("поиска"));
    assert_eq!(
        bot.engine().current(ADMIN),
        Some(StateTag::WaitingSearchQuery)
    );

    let results = text(&bot, &conn, ADMIN, "Dune");
    assert_eq!(results.text, render::NOTHING_FOUND);
    assert_eq!(
        SqliteBookRepository::new(&conn).count_books(None).unwrap(),
        0
    );
}

#[test]
fn decoded_page_past_the_end_shows_last_page() {
    let conn = open_db_in_memory().unwrap();
    seed_book(&conn, "Only", 2001, Genre::Literature);
    let bot = bot();

    let choice: Choice = serde_json::from_str(
        r#"{"kind":"show_genre","genre":"literature","page":4294967295}"#,
    )
    .unwrap();
    let response = choose(&bot, &conn, READER, choice);
    assert!(response.text.contains("(страница 1)"));
    assert!(response.text.contains("Only"));
    assert!(!response
        .buttons()
        .any(|button| matches!(button.choice, Choice::ShowGenre { .. })));
}

#[test]
fn genre_pages_navigate_and_open_cards() {
    let conn = open_db_in_memory().unwrap();
    for index in 0..7 {
        seed_book(&conn, &format!("Lit {index}"), 2000 + index, Genre::Literature);
    }
    let bot = bot();

    let empty = choose(
        &bot,
        &conn,
        READER,
        Choice::ShowGenre {
            genre: Genre::Technical,
            page: 0,
        },
    );
    assert_eq!(empty.text, render::NO_BOOKS_IN_GENRE);

    let first = choose(
        &bot,
        &conn,
        READER,
        Choice::ShowGenre {
            genre: Genre::Literature,
            page: 0,
        },
    );
    let choices = first
        .buttons()
        .map(|button| button.choice.clone())
        .collect::<Vec<_>>();
    assert_eq!(
        choices
            .iter()
            .filter(|choice| matches!(choice, Choice::OpenBook { .. }))
            .count(),
        5
    );
    assert!(choices.contains(&Choice::ShowGenre {
        genre: Genre::Literature,
        page: 1
    }));
    assert!(choices.contains(&Choice::BackToGenres));

    let second = choose(
        &bot,
        &conn,
        READER,
        Choice::ShowGenre {
            genre: Genre::Literature,
            page: 1,
        },
    );
    let second_choices = second
        .buttons()
        .map(|button| button.choice.clone())
        .collect::<Vec<_>>();
    assert!(second_choices.contains(&Choice::ShowGenre {
        genre: Genre::Literature,
        page: 0
    }));
    assert!(!second_choices.contains(&Choice::ShowGenre {
        genre: Genre::Literature,
        page: 2
    }));

    let Some(Choice::OpenBook { book_id }) = choices.first().cloned() else {
        panic!("first button should open a book");
    };
    let card = choose(&bot, &conn, READER, Choice::OpenBook { book_id });
    assert!(card.text.contains("Lit 6"));
    assert_eq!(
        card.choices[0][0].choice,
        Choice::ToggleFavorite { book_id }
    );
    assert_eq!(card.choices[0][0].label, render::toggle_label(false));

    let toggled = choose(&bot, &conn, READER, Choice::ToggleFavorite { book_id });
    assert_eq!(toggled.choices[0][0].label, render::toggle_label(true));
    assert!(SqliteFavoriteRepository::new(&conn)
        .is_favorite(READER, book_id)
        .unwrap());
}

#[test]
fn search_flow_lists_matches_and_clears_state() {
    let conn = open_db_in_memory().unwrap();
    seed_book(&conn, "Дюна", 1965, Genre::Literature);
    seed_book(&conn, "Дети Дюны", 1976, Genre::Literature);
    let bot = bot();

    let prompt = command(&bot, &conn, READER, Command::Search);
    assert!(prompt.text.contains("поиска"));
    let results = text(&bot, &conn, READER, "ДЮН");
    assert_eq!(results.buttons().count(), 2);
    assert_eq!(
        results.choices[0][0].label,
        "📖 Дети Дюны"
    );
    assert_eq!(bot.engine().current(READER), None);

    command(&bot, &conn, READER, Command::Search);
    let nothing = text(&bot, &conn, READER, "Толстой");
    assert_eq!(nothing.text, render::NOTHING_FOUND);
}

#[test]
fn search_offers_at_most_ten_buttons() {
    let conn = open_db_in_memory().unwrap();
    for index in 0..15 {
        seed_book(&conn, &format!("Common {index}"), 1990 + index, Genre::Technical);
    }
    let bot = bot();

    command(&bot, &conn, READER, Command::Search);
    let results = text(&bot, &conn, READER, "common");
    assert_eq!(results.buttons().count(), 10);
    assert!(results.text.contains("Найдено книг: 15"));
}

#[test]
fn profile_shows_favorites_and_top_three_recommendations() {
    let conn = open_db_in_memory().unwrap();
    let favorite = seed_book(&conn, "Favorite", 2000, Genre::Technical);
    for index in 0..5 {
        seed_book(&conn, &format!("Rec {index}"), 2010 + index, Genre::Technical);
    }
    let bot = bot();

    let empty = command(&bot, &conn, READER, Command::Profile);
    assert!(empty.text.contains("пусто"));

    let picker = choose(&bot, &conn, READER, Choice::ProfileAddPicker);
    assert!(picker
        .buttons()
        .any(|button| button.choice == Choice::AddFavorite { book_id: favorite }));
    let added = choose(&bot, &conn, READER, Choice::AddFavorite { book_id: favorite });
    assert_eq!(added.text, render::favorite_added(true));
    let again = choose(&bot, &conn, READER, Choice::AddFavorite { book_id: favorite });
    assert_eq!(again.text, render::favorite_added(false));

    let profile = choose(&bot, &conn, READER, Choice::BackToProfile);
    assert!(profile.text.contains("• Favorite - Author (2000)"));
    assert!(profile.text.contains("Rec 4"));
    assert!(profile.text.contains("Rec 2"));
    assert!(!profile.text.contains("Rec 1"));

    let remove_picker = choose(&bot, &conn, READER, Choice::ProfileRemovePicker);
    assert_eq!(
        remove_picker.choices[0][0].choice,
        Choice::RemoveFavorite { book_id: favorite }
    );
    let removed = choose(&bot, &conn, READER, Choice::RemoveFavorite { book_id: favorite });
    assert_eq!(removed.text, render::favorite_removed(true));
    let none_left = choose(&bot, &conn, READER, Choice::ProfileRemovePicker);
    assert_eq!(none_left.text, render::NO_FAVORITES);
}

#[test]
fn admin_edits_and_deletes_with_confirmation() {
    let conn = open_db_in_memory().unwrap();
    let book_id = seed_book(&conn, "Typo", 2000, Genre::Literature);
    SqliteUserRepository::new(&conn)
        .upsert_user(READER, None)
        .unwrap();
    SqliteFavoriteRepository::new(&conn)
        .add_favorite(READER, book_id)
        .unwrap();
    let bot = bot();

    let list = command(&bot, &conn, ADMIN, Command::EditBooks);
    assert_eq!(list.choices[0][0].choice, Choice::EditBook { book_id });

    let menu = choose(&bot, &conn, ADMIN, Choice::EditBook { book_id });
    let menu_choices = menu
        .buttons()
        .map(|button| button.choice.clone())
        .collect::<Vec<_>>();
    for field in EditableField::ALL {
        assert!(menu_choices.contains(&Choice::EditField { book_id, field }));
    }
    assert!(menu_choices.contains(&Choice::DeleteBook { book_id }));
    assert!(menu_choices.contains(&Choice::BackToEditList));

    choose(
        &bot,
        &conn,
        ADMIN,
        Choice::EditField {
            book_id,
            field: EditableField::Title,
        },
    );
    let updated = text(&bot, &conn, ADMIN, "Fixed");
    assert_eq!(updated.text, render::field_updated(EditableField::Title));
    let books = SqliteBookRepository::new(&conn);
    assert_eq!(books.get_book(book_id).unwrap().unwrap().title, "Fixed");

    let confirm = choose(&bot, &conn, ADMIN, Choice::DeleteBook { book_id });
    assert!(confirm.text.contains("Fixed"));
    assert!(books.get_book(book_id).unwrap().is_some());

    let deleted = choose(&bot, &conn, ADMIN, Choice::ConfirmDelete { book_id });
    assert_eq!(deleted.text, render::BOOK_DELETED);
    assert!(books.get_book(book_id).unwrap().is_none());
    assert!(SqliteFavoriteRepository::new(&conn)
        .list_favorites(READER)
        .unwrap()
        .is_empty());

    let again = choose(&bot, &conn, ADMIN, Choice::ConfirmDelete { book_id });
    assert_eq!(again.text, render::NOT_FOUND);
}

#[test]
fn statistics_count_books_and_users() {
    let conn = open_db_in_memory().unwrap();
    seed_book(&conn, "A", 2000, Genre::Literature);
    seed_book(&conn, "B", 2001, Genre::Literature);
    seed_book(&conn, "C", 2002, Genre::Technical);
    let bot = bot();

    command(&bot, &conn, READER, Command::Start);
    let stats = command(&bot, &conn, ADMIN, Command::Statistics);
    assert!(stats.text.contains("Всего книг: 3"));
    assert!(stats.text.contains("Всего пользователей: 2"));
    assert!(stats.text.contains("Литература: 2 книг"));
    assert!(stats.text.contains("Тех литература: 1 книг"));
}

#[test]
fn unknown_text_without_flow_gets_menu_hint() {
    let conn = open_db_in_memory().unwrap();
    let bot = bot();

    let response = text(&bot, &conn, READER, "привет");
    assert_eq!(response.text, render::UNKNOWN_INPUT);
    assert_eq!(response.menu, Some(Menu::Main { admin: false }));

    let stale = choose(&bot, &conn, READER, Choice::PickSubgenre { subgenre: None });
    assert_eq!(stale.text, render::NO_ACTIVE_FLOW);
}
