//! Product queries.

use sqlx::{Postgres, QueryBuilder};

use product_review_core::{
    CatalogFilter, CatalogStats, Page, PageRequest, ProductId, ProductSortField, RatingSummary,
    SortField, SortSpec,
};

use super::{
    PRODUCT_COLUMNS, PgStore, ProductRow, collect_rows, push_filter, to_bound, to_count,
};
use crate::db::RepositoryError;
use crate::models::{NewProduct, Product};

impl PgStore {
    pub(crate) async fn list_products(
        &self,
        filter: &CatalogFilter,
        page: PageRequest,
        sort: SortSpec<ProductSortField>,
    ) -> Result<Page<Product>, RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM catalog.product p");
        push_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {PRODUCT_COLUMNS} FROM catalog.product p"));
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY ")
            .push(sort.field.column())
            .push(' ')
            .push(sort.direction.as_sql())
            .push(", p.id ASC LIMIT ")
            .push_bind(to_bound(page.limit()))
            .push(" OFFSET ")
            .push_bind(to_bound(page.offset()));

        let rows: Vec<ProductRow> = query.build_query_as().fetch_all(&self.pool).await?;
        Ok(Page::new(collect_rows(rows)?, page, to_count(total)))
    }

    pub(crate) async fn catalog_stats(
        &self,
        filter: &CatalogFilter,
    ) -> Result<CatalogStats, RepositoryError> {
        let mut products = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM catalog.product p");
        push_filter(&mut products, filter);
        let total_products: i64 = products.build_query_scalar().fetch_one(&self.pool).await?;

        let mut reviews = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(r.id), COALESCE(SUM(r.rating), 0)::BIGINT \
             FROM catalog.review r JOIN catalog.product p ON p.id = r.product_id",
        );
        push_filter(&mut reviews, filter);
        let (review_count, rating_sum): (i64, i64) =
            reviews.build_query_as().fetch_one(&self.pool).await?;

        Ok(CatalogStats::new(
            to_count(total_products),
            RatingSummary::from_totals(to_count(review_count), to_count(rating_sum)),
        ))
    }

    pub(crate) async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM catalog.product p WHERE p.id = $1");
        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Product::try_from)
            .transpose()
    }

    pub(crate) async fn count_products(&self) -> Result<u64, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog.product")
            .fetch_one(&self.pool)
            .await?;
        Ok(to_count(total))
    }

    pub(crate) async fn product_ids(&self) -> Result<Vec<ProductId>, RepositoryError> {
        Ok(
            sqlx::query_scalar("SELECT id FROM catalog.product ORDER BY id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub(crate) async fn insert_product(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO catalog.product (name, description, price, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price.amount())
        .bind(&new.image_url)
        .fetch_one(&mut *tx)
        .await?;

        let categories: Vec<String> = new.categories.iter().cloned().collect();
        sqlx::query(
            "INSERT INTO catalog.product_category (product_id, category) \
             SELECT $1, unnest($2::TEXT[])",
        )
        .bind(id)
        .bind(&categories)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_product(id).await?.ok_or(RepositoryError::NotFound)
    }

    pub(crate) async fn clear(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            "TRUNCATE catalog.review_vote, catalog.wishlist_item, catalog.notification, \
             catalog.review, catalog.product_category, catalog.product RESTART IDENTITY",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
