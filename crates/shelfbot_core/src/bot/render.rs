//! User-facing message text.

use crate::access::AdminAction;
use crate::dialogue::{Prompt, Rejection};
use crate::model::book::{Book, MAX_YEAR, MIN_YEAR};
use crate::model::field::{EditableField, FieldValueError, CLEAR_SUBGENRE_INPUT};
use crate::model::genre::Genre;
use crate::service::stats_service::CatalogStats;

const CARD_DESCRIPTION_CHARS: usize = 200;

pub const SKIP_SUBGENRE_LABEL: &str = "⏭️ Пропустить";
pub const NOT_FOUND: &str = "Книга не найдена ❌";
pub const NO_BOOKS_IN_GENRE: &str = "В этом жанре пока нет книг 😔";
pub const NO_BOOKS_IN_CATALOG: &str = "В базе данных пока нет книг.";
pub const NO_FAVORITES: &str = "У вас нет любимых книг.";
pub const NOTHING_FOUND: &str = "Книги не найдены 😔\nПопробуйте изменить запрос.";
pub const CHOOSE_GENRE: &str = "Выберите жанр:";
pub const ADMIN_PANEL: &str = "Админ панель:";
pub const CANCELLED: &str = "Действие отменено.";
pub const NOTHING_TO_CANCEL: &str = "Нечего отменять.";
pub const UNKNOWN_INPUT: &str = "Не понимаю 🤔 Выберите действие из меню.";
pub const NO_ACTIVE_FLOW: &str = "Это действие уже неактуально.";
pub const BOOK_DELETED: &str = "✅ Книга успешно удалена!";

pub fn genre_emoji(name: &str) -> &'static str {
    match name {
        "Литература" => "📚",
        "Тех литература" | "Программирование" => "💻",
        "Художественная" => "📖",
        "Классическая" => "📜",
        "Детектив" => "🕵️",
        "Роман" => "💝",
        "Фантастика" => "🚀",
        "Драма" => "🎭",
        "Инженерия" => "🔧",
        "Наука" => "🔬",
        "Архитектура" => "🏗️",
        "Экономика" => "📊",
        "Медицина" => "🏥",
        _ => "📖",
    }
}

pub fn genre_label(genre: Genre) -> String {
    format!("{} {}", genre_emoji(genre.as_str()), genre.as_str())
}

pub fn subgenre_label(subgenre: &str) -> String {
    format!("{} {}", genre_emoji(subgenre), subgenre)
}

pub fn welcome(handle: Option<&str>) -> String {
    let name = handle.unwrap_or("читатель");
    format!(
        "Добро пожаловать, {name}! 📚\n\nЭто бот для управления библиотекой книг.\nВыберите действие из меню ниже:"
    )
}

pub fn book_line(book: &Book) -> String {
    format!("📖 {} - {} ({})", book.title, book.author, book.year)
}

/// Multi-line book card; long descriptions are cut.
pub fn book_card(book: &Book) -> String {
    let mut text = format!(
        "📖 {}\n👤 Автор: {}\n📅 Год: {}\n🏷️ Жанр: {}",
        book.title, book.author, book.year, book.genre
    );
    if let Some(subgenre) = &book.subgenre {
        text.push_str(" / ");
        text.push_str(subgenre);
    }
    if let Some(file) = &book.file {
        text.push_str(&format!("\n📎 Файл: {} ({} байт)", file.file_name, file.file_size));
    }
    text.push_str("\n\n📝 Описание:\n");
    text.push_str(&truncate(&book.description, CARD_DESCRIPTION_CHARS));
    text
}

pub fn genre_page(genre: Genre, page: u32, books: &[Book]) -> String {
    let mut text = format!("{} (страница {}):\n\n", genre_label(genre), page.saturating_add(1));
    text.push_str(&book_lines(books));
    text
}

pub fn search_results(books: &[Book]) -> String {
    format!("🔍 Найдено книг: {}\n\n{}", books.len(), book_lines(books))
}

pub fn profile(favorites: &[Book], recommendations: &[Book]) -> String {
    if favorites.is_empty() {
        return "📚 Ваш профиль:\n\n❤️ Любимые книги: пусто\n\nДобавьте книги в избранное, чтобы получать персональные рекомендации!".to_string();
    }

    let mut text = String::from("📚 Ваш профиль:\n\n❤️ Любимые книги:\n");
    for book in favorites {
        text.push_str(&format!("• {} - {} ({})\n", book.title, book.author, book.year));
    }
    if !recommendations.is_empty() {
        text.push_str("\n💡 Рекомендации для вас:\n");
        for book in recommendations {
            text.push_str(&format!("• {} - {}\n", book.title, book.author));
        }
    }
    text.trim_end().to_string()
}

pub fn statistics(stats: &CatalogStats) -> String {
    let mut text = format!(
        "📊 Статистика бота:\n\n📚 Всего книг: {}\n👥 Всего пользователей: {}\n",
        stats.total_books, stats.total_users
    );
    for (genre, count) in &stats.books_by_genre {
        text.push_str(&format!("\n{}: {count} книг", genre_label(*genre)));
    }
    text
}

pub fn favorite_added(added: bool) -> &'static str {
    if added {
        "Книга добавлена в избранное ❤️"
    } else {
        "Книга уже в избранном или не найдена ❌"
    }
}

pub fn favorite_removed(removed: bool) -> &'static str {
    if removed {
        "Книга удалена из избранного 💔"
    } else {
        "Этой книги нет в избранном ❌"
    }
}

pub fn toggle_label(is_favorite: bool) -> &'static str {
    if is_favorite {
        "💔 Удалить из избранного"
    } else {
        "❤️ Добавить в избранное"
    }
}

pub fn denied(action: AdminAction) -> &'static str {
    match action {
        AdminAction::OpenPanel => "У вас нет доступа к админ панели ❌",
        AdminAction::AddBook => "У вас нет прав для добавления книг ❌",
        AdminAction::ListForEdit | AdminAction::EditField => {
            "У вас нет прав для редактирования книг ❌"
        }
        AdminAction::DeleteBook => "У вас нет прав для удаления книг ❌",
        AdminAction::ViewStatistics => "У вас нет доступа к статистике ❌",
    }
}

pub fn field_label(field: EditableField) -> &'static str {
    match field {
        EditableField::Title => "📝 Название",
        EditableField::Author => "👤 Автора",
        EditableField::Year => "📅 Год",
        EditableField::Description => "📖 Описание",
        EditableField::Genre => "🏷️ Жанр",
        EditableField::Subgenre => "🔖 Поджанр",
    }
}

fn field_noun(field: EditableField) -> &'static str {
    match field {
        EditableField::Title => "название",
        EditableField::Author => "автора",
        EditableField::Year => "год издания",
        EditableField::Description => "описание",
        EditableField::Genre => "жанр",
        EditableField::Subgenre => "поджанр",
    }
}

pub fn field_updated(field: EditableField) -> String {
    format!("✅ Поле «{}» успешно обновлено!", field_noun(field))
}

pub fn book_created(book_id: i64, title: &str) -> String {
    format!("✅ Книга «{title}» успешно добавлена! (id {book_id})")
}

pub fn confirm_delete(book: &Book) -> String {
    format!(
        "⚠️ Вы уверены, что хотите удалить книгу «{}»?\nЭто действие нельзя отменить.",
        book.title
    )
}

pub fn prompt(prompt: &Prompt) -> String {
    match prompt {
        Prompt::Title => "Введите название книги:".to_string(),
        Prompt::Year => "Введите год издания:".to_string(),
        Prompt::Author => "Введите автора книги:".to_string(),
        Prompt::Description => "Введите описание книги:".to_string(),
        Prompt::Genre => CHOOSE_GENRE.to_string(),
        Prompt::Subgenre { .. } => "Выберите поджанр (или пропустите):".to_string(),
        Prompt::FieldValue { field, .. } => match field {
            EditableField::Genre => {
                let names = Genre::ALL.map(Genre::as_str).join(", ");
                format!("Введите новый жанр ({names}):")
            }
            EditableField::Subgenre => format!(
                "Введите новый поджанр (или «{CLEAR_SUBGENRE_INPUT}», чтобы убрать):"
            ),
            other => format!("Введите новое значение: {}", field_noun(*other)),
        },
        Prompt::SearchQuery => "Введите название книги или автора для поиска:".to_string(),
    }
}

pub fn rejection(reason: &Rejection) -> String {
    match reason {
        Rejection::BlankText => "Значение не может быть пустым.".to_string(),
        Rejection::InvalidValue(FieldValueError::NotAnInteger(_)) => {
            "Пожалуйста, введите корректный год (число):".to_string()
        }
        Rejection::InvalidValue(FieldValueError::YearOutOfRange(year)) => {
            format!("Год {year} вне допустимого диапазона {MIN_YEAR}–{MAX_YEAR}.")
        }
        Rejection::InvalidValue(FieldValueError::UnknownGenre(value)) => {
            format!("Неизвестный жанр «{value}».")
        }
        Rejection::InvalidValue(FieldValueError::Blank(_)) => {
            "Значение не может быть пустым.".to_string()
        }
        Rejection::ExpectedChoice => "Пожалуйста, выберите вариант из списка.".to_string(),
        Rejection::UnexpectedChoice => "Этот вариант сейчас недоступен.".to_string(),
    }
}

fn book_lines(books: &[Book]) -> String {
    books
        .iter()
        .map(book_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut = text.chars().take(max_chars).collect::<String>();
    cut.push_str("...");
    cut
}
