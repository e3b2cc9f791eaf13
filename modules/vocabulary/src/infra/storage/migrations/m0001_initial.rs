use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Languages {
    Table,
    Id,
    ExternalId,
    Name,
    NativeName,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    ExternalId,
    Username,
    Email,
    IdentityId,
}

#[derive(DeriveIden)]
enum Words {
    Table,
    Id,
    ExternalId,
    Sentence,
    Translation,
    Description,
    LanguageId,
    LanguageToId,
    UserId,
}

#[derive(DeriveIden)]
enum Translations {
    Table,
    Id,
    ExternalId,
    Content,
    LanguageId,
    WordId,
    CreatedAt,
    UpdatedAt,
}

fn id<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn external_id<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().unique_key().to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Languages::Table)
                    .if_not_exists()
                    .col(&mut id(Languages::Id))
                    .col(&mut external_id(Languages::ExternalId))
                    .col(
                        ColumnDef::new(Languages::Name)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Languages::NativeName).string_len(64).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(&mut id(Users::Id))
                    .col(&mut external_id(Users::ExternalId))
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Users::IdentityId)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Words::Table)
                    .if_not_exists()
                    .col(&mut id(Words::Id))
                    .col(&mut external_id(Words::ExternalId))
                    .col(ColumnDef::new(Words::Sentence).string_len(255).not_null())
                    .col(ColumnDef::new(Words::Translation).string_len(255).not_null())
                    .col(ColumnDef::new(Words::Description).text().null())
                    .col(ColumnDef::new(Words::LanguageId).integer().not_null())
                    .col(ColumnDef::new(Words::LanguageToId).integer().not_null())
                    .col(ColumnDef::new(Words::UserId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_words_language")
                            .from(Words::Table, Words::LanguageId)
                            .to(Languages::Table, Languages::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_words_language_to")
                            .from(Words::Table, Words::LanguageToId)
                            .to(Languages::Table, Languages::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_words_user")
                            .from(Words::Table, Words::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Translations::Table)
                    .if_not_exists()
                    .col(&mut id(Translations::Id))
                    .col(&mut external_id(Translations::ExternalId))
                    .col(ColumnDef::new(Translations::Content).text().not_null())
                    .col(ColumnDef::new(Translations::LanguageId).integer().null())
                    .col(ColumnDef::new(Translations::WordId).integer().null())
                    .col(
                        ColumnDef::new(Translations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Translations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_translations_language")
                            .from(Translations::Table, Translations::LanguageId)
                            .to(Languages::Table, Languages::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_translations_word")
                            .from(Translations::Table, Translations::WordId)
                            .to(Words::Table, Words::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_words_user_id")
                    .table(Words::Table)
                    .col(Words::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Translations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Words::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Languages::Table).to_owned())
            .await
    }
}
