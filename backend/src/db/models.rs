use diesel::prelude::*;

use crate::db::schema::*;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, PartialEq)]
#[diesel(table_name = books)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Book {
    pub id: i32,
    pub name_telugu: String,
    pub name_english: String,
    pub testament: String,
    pub chapter_count: i32,
    pub verse_count: i32,
}

#[derive(Insertable)]
#[diesel(table_name = books)]
pub struct NewBook<'a> {
    pub id: i32,
    pub name_telugu: &'a str,
    pub name_english: &'a str,
    pub testament: &'a str,
    pub chapter_count: i32,
    pub verse_count: i32,
}

// QueryableByName lets full-text search hits load through sql_query.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable, Identifiable, Associations, PartialEq)]
#[diesel(belongs_to(Book, foreign_key = book_id))]
#[diesel(table_name = verses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Verse {
    pub id: i32,
    pub book_id: i32,
    pub chapter: i32,
    pub verse: i32,
    pub text: String,
}

#[derive(Insertable)]
#[diesel(table_name = verses)]
pub struct NewVerse<'a> {
    pub book_id: i32,
    pub chapter: i32,
    pub verse: i32,
    pub text: &'a str,
}
